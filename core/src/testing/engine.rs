//! Verdict engines: pure decision procedures over observed stage outcomes.
//!
//! Nothing here spawns a process or touches the filesystem. Stage outcomes
//! and golden bytes arrive as values, so every branch is testable with
//! in-memory fixtures and re-evaluating the same inputs always yields the
//! same verdict.

use super::case::{Category, TestCase};
use super::diff::{self, DiffOutcome};
use super::outcome::{exit_code, FailReport, StageOutcome, Verdict};

/// What the compile stage outcome settles on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileJudgment {
    Settled(Verdict),
    /// Compilation succeeded and the category expects a runnable program;
    /// the emulate stage must be invoked before a verdict exists.
    NeedsEmulation,
}

/// Judge the compile stage of a two-stage test.
///
/// Expected-compile-failure categories settle here in both directions: a
/// `w-`/`s-` case passes on the matching error code and fails on a clean
/// compile, without ever reaching the emulator. Exit code 1 means the
/// compiler rejected its own command line, which indicts the harness, not
/// the test case.
pub fn judge_compile(case: &TestCase, compile: &StageOutcome) -> CompileJudgment {
    use CompileJudgment::*;

    match compile.status {
        exit_code::CLI_ARG_ERROR => Settled(Verdict::HarnessFatal {
            message: "Invalid command line arguments (compiler exited with code 1)".to_owned(),
        }),
        exit_code::SYNTAX_ERROR if case.category() == Category::SyntaxError => {
            Settled(Verdict::Pass)
        }
        exit_code::SEMANTIC_ERROR if case.category() == Category::SemanticError => {
            Settled(Verdict::Pass)
        }
        exit_code::OK => match case.category() {
            Category::SyntaxError | Category::SemanticError => Settled(Verdict::Fail(FailReport {
                reason: format!(
                    "expected a {} but compilation succeeded",
                    case.category()
                ),
                status: Some(exit_code::OK),
                diff: None,
                stdout: None,
            })),
            Category::CorrectProgram | Category::RuntimeError => NeedsEmulation,
        },
        status => Settled(Verdict::Fail(FailReport {
            reason: format!("compilation exited with error code {}", status),
            status: Some(status),
            diff: None,
            stdout: None,
        })),
    }
}

/// Judge the emulate stage, reached only after a clean compile of a
/// `c-`/`r-` case. `golden` is the golden file's bytes if the case has one.
pub fn judge_emulation(
    case: &TestCase,
    compile: &StageOutcome,
    emulate: &StageOutcome,
    golden: Option<&[u8]>,
) -> Verdict {
    if !emulate.succeeded() {
        if case.category() == Category::RuntimeError {
            return Verdict::Pass;
        }
        return Verdict::Fail(FailReport {
            reason: format!("emulator failure (exit code {})", emulate.status),
            status: Some(emulate.status),
            diff: None,
            stdout: Some(String::from_utf8_lossy(&emulate.stdout).into_owned()),
        });
    }

    let Some(golden) = golden else {
        return Verdict::SkippedNoGolden {
            warning: format!("{} does not have a sample output file", case.name()),
        };
    };

    match diff::compare(golden, &emulate.stdout) {
        DiffOutcome::Match => Verdict::Pass,
        DiffOutcome::Mismatch(diff) => Verdict::Fail(FailReport {
            reason: "emulator output differs from the sample output".to_owned(),
            status: Some(compile.status),
            diff: Some(diff),
            stdout: None,
        }),
    }
}

/// Full two-stage evaluation. `emulate` is absent when the compile stage
/// settled the case before stage B was (or could be) invoked.
pub fn evaluate(
    case: &TestCase,
    compile: &StageOutcome,
    emulate: Option<&StageOutcome>,
    golden: Option<&[u8]>,
) -> Verdict {
    match judge_compile(case, compile) {
        CompileJudgment::Settled(verdict) => verdict,
        CompileJudgment::NeedsEmulation => match emulate {
            Some(em) => judge_emulation(case, compile, em, golden),
            None => Verdict::HarnessFatal {
                message: format!(
                    "no emulation outcome for '{}' although compilation succeeded",
                    case.name()
                ),
            },
        },
    }
}

/// Single-stage evaluation: the stage's stdout is always diffed against the
/// golden file, whatever the category. Golden presence is a discovery-time
/// precondition for this suite kind, so the bytes arrive unconditionally.
pub fn evaluate_single(case: &TestCase, outcome: &StageOutcome, golden: &[u8]) -> Verdict {
    match diff::compare(golden, &outcome.stdout) {
        DiffOutcome::Match => Verdict::Pass,
        DiffOutcome::Mismatch(diff) => Verdict::Fail(FailReport {
            reason: format!("output of {} differs from the sample output", case.name()),
            status: Some(outcome.status),
            diff: Some(diff),
            stdout: None,
        }),
    }
}
