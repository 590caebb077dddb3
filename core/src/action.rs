pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::path::Path;
use std::time::Duration;

use error::*;
use indicatif::{ProgressBar, ProgressStyle};
use lazy_regex::regex_captures;
use tokio::process::Command;

use crate::config::{Config, SuiteConfig};
use crate::style;
use crate::testing::{
    case::TestCase,
    orchestrator,
    outcome::{RunFailure, RunResult, Verdict},
    runner::{ShellToolchain, SuiteMode},
};

/// Run the configured build commands in order, stopping at the first one
/// that fails. The toolchain must be built before any suite runs.
pub async fn build_toolchain(cfg: &Config) -> Result<()> {
    for cmd in &cfg.build.commands {
        log::info!("Building: {}", cmd);
        let status = Command::new(&cfg.harness.shell)
            .args(["-c", cmd])
            .status()
            .await
            .with_context(|| {
                format!(
                    "Failed to spawn '{} -c {}'",
                    cfg.harness.shell.to_string_lossy(),
                    cmd
                )
            })?;
        if !status.success() {
            bail!("Build failed: '{}' exited with {}", cmd, status);
        }
    }
    Ok(())
}

/// Run one suite (or just `only`, when a single case was selected) and
/// render verdicts as they arrive. Returns the aggregate for the caller to
/// turn into a process exit status.
pub async fn run_suite(
    cfg: &Config,
    suite: &SuiteConfig,
    only: Option<&TestCase>,
) -> Result<RunResult> {
    let dir = cfg.testcase_dir(suite);
    let cmd = suite.command.to_command();
    let mode = cmd.mode();

    let cases: Vec<TestCase> = match only {
        Some(case) => vec![case.clone()],
        None => TestCase::enumerate(&dir, &suite.include)
            .context("Failed to enumerate test cases")?,
    };
    ensure!(
        !cases.is_empty(),
        "No test cases found in {}",
        dir.to_string_lossy()
    );
    if mode == SuiteMode::Single {
        // Golden files are a precondition of this suite kind, checked
        // before anything is spawned.
        for case in &cases {
            ensure!(
                case.golden_file().is_some(),
                "{} does not have a sample output file",
                case.name()
            );
        }
    }

    let driver = ShellToolchain::new(cmd).shell(&cfg.harness.shell);

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner} [{pos}/{len}] {msg}")
        .unwrap();
    let bar = ProgressBar::new(cases.len() as u64).with_style(bar_style);
    bar.enable_steady_tick(Duration::from_millis(50));

    let result = orchestrator::orchestrate(&driver, mode, &cases, |case, verdict| {
        bar.println(format!(
            " {} {}",
            style::verdict_badge(verdict.kind()),
            case.name()
        ));
        if let Verdict::SkippedNoGolden { warning } = verdict {
            bar.println(format!("{}{}", style::warning_label(), warning));
        }
        bar.set_message(case.name().to_owned());
        bar.inc(1);
    })
    .await;
    bar.finish_and_clear();

    match &result.failure {
        Some(RunFailure::Case { name, report }) => style::print_fail_report(name, report),
        Some(RunFailure::Fatal { message }) => {
            println!("\n{}{}", style::error_label(), message)
        }
        None => {}
    }
    style::print_run_summary(&result, cases.len());

    Ok(result)
}

/// Resolve a user-supplied source path into the suite it belongs to and a
/// discovered `TestCase`. The path must look like
/// `<testdata>/<suite-dir>/<prefix>-<name>.<ext>`.
pub fn select_single_case<'c>(cfg: &'c Config, path: &Path) -> Result<(&'c SuiteConfig, TestCase)> {
    let path_str = path.to_string_lossy();
    let Some((_, dir, filename)) =
        regex_captures!(r"(?:^|/)([0-9A-Za-z_-]+)/([cwsr]-[0-9A-Za-z_.-]+)$", &path_str)
    else {
        bail!(
            "Invalid test case path '{}'. Should be something like '{}'",
            path_str,
            cfg.harness
                .testdata_dir
                .join("compiler/c-example.gt")
                .to_string_lossy()
        );
    };

    let suite = cfg
        .suite
        .iter()
        .find(|s| s.dir.as_os_str() == dir)
        .with_context(|| format!("No suite is configured for testdata dir '{}'", dir))?;
    ensure!(
        suite.include.matches(filename),
        "'{}' does not match the include pattern '{}' of suite '{}'",
        filename,
        suite.include.as_str(),
        suite.name
    );
    ensure!(path.is_file(), "No such test case file: {}", path_str);

    let case = TestCase::from_source_path(path)?;
    Ok((suite, case))
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> Config {
        Config::from_toml(&Config::example_toml()).unwrap()
    }

    #[test]
    fn select_single_case_rejects_malformed_paths() {
        let cfg = config();
        for path in [
            "c-add.gt",
            "testdata/compiler/x-add.gt",
            "testdata/compiler/",
            "somewhere/else",
        ] {
            assert!(
                select_single_case(&cfg, Path::new(path)).is_err(),
                "path {} should be rejected",
                path
            );
        }
    }

    #[test]
    fn select_single_case_rejects_unknown_suite_dirs() {
        let cfg = config();
        let err = select_single_case(&cfg, Path::new("testdata/linker/c-add.gt")).unwrap_err();
        assert!(err.to_string().contains("linker"), "{}", err);
    }

    #[test]
    fn select_single_case_checks_the_include_pattern() {
        let cfg = config();
        let err = select_single_case(&cfg, Path::new("testdata/compiler/c-add.oz")).unwrap_err();
        assert!(err.to_string().contains("include pattern"), "{}", err);
    }
}
