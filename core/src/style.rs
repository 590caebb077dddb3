use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::testing::outcome::{FailReport, RunResult, VerdictKind};

#[macro_export]
macro_rules! print_success {
    ($($arg:tt)*) => {{
        use ::colored::Colorize as _;
        println!("{}", format!($($arg)*).green())
    }}
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false;
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for VerdictKind {
    fn color(&self) -> Color {
        use VerdictKind::*;
        if !self::is_truecolor_supported() {
            return match self {
                Pass => Color::Green,
                Fail => Color::Red,
                Skip => Color::Yellow,
                Fatal => Color::Magenta,
            };
        }

        match self {
            Pass => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Fail => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
            Skip => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            Fatal => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
        }
    }
}

pub fn verdict_badge(kind: VerdictKind) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", kind).on_color(kind.color()).bold().color(fg)
}

pub fn error_label() -> ColoredString {
    "Error: ".red()
}

pub fn warning_label() -> ColoredString {
    "Warning: ".bright_yellow().bold()
}

pub fn print_fail_report(case_name: &str, report: &FailReport) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));

    const BOLD_LINE: &str = "━";
    let bold_bar = BOLD_LINE.repeat(cols as usize).blue().bold();

    println!(
        "\n{}{}",
        error_label(),
        case_name.bright_yellow().bold()
    );
    println!("{}", report.reason);
    if let Some(status) = report.status {
        println!("Return code: {}", status);
    }
    println!("{}", bold_bar);

    if let Some(diff) = &report.diff {
        println!("{}", "Diff:".cyan().bold());
        for line in diff.lines() {
            if let Some(rest) = line.strip_prefix('-') {
                println!("{}{}", "-".red(), rest.red());
            } else if let Some(rest) = line.strip_prefix('+') {
                println!("{}{}", "+".green(), rest.green());
            } else {
                println!("{}", line);
            }
        }
    } else if let Some(stdout) = &report.stdout {
        println!("{}", "Stdout:".cyan().bold());
        if stdout.is_empty() {
            println!("{}", "<EMPTY>".magenta().dimmed());
        } else {
            print!("{}", stdout);
            if !stdout.ends_with('\n') {
                println!();
            }
        }
    }

    println!("{}", bold_bar);
}

pub fn print_run_summary(res: &RunResult, total: usize) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    if res.is_pass() {
        let msg = format!("All {} tests passed ✨", res.executed);
        print!("{}", msg.green());
        if !res.warnings.is_empty() {
            print!(
                " {}",
                format!("({} skipped: no sample output)", res.warnings.len()).yellow()
            );
        }
    } else {
        let msg = format!(
            "Stopped at the first failure ({}/{} tests ran) 💣",
            res.executed, total
        );
        print!("{}", msg.bright_red());
    }

    println!(" {}", bar);
}
