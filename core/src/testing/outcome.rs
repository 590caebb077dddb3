use std::ops::ControlFlow;

use serde::Serialize;

/// Exit statuses of the compile stage. These are the compiler's own
/// conventions, not portable OS codes; anything outside this set is an
/// unspecified compilation failure.
pub mod exit_code {
    pub const OK: i32 = 0;
    pub const CLI_ARG_ERROR: i32 = 1;
    pub const SYNTAX_ERROR: i32 = 2;
    pub const SEMANTIC_ERROR: i32 = 3;
}

/// What one external stage invocation produced: its exit status and the
/// stdout bytes that were captured. Signal termination folds to status -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub status: i32,
    pub stdout: Vec<u8>,
}

impl StageOutcome {
    pub fn new(status: i32, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == exit_code::OK
    }
}

/// Diagnostic attached to a failing verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailReport {
    pub reason: String,
    /// Exit status of the stage the failure is attributed to.
    pub status: Option<i32>,
    /// Line diff against the golden file, when the failure is a mismatch.
    pub diff: Option<String>,
    /// Captured stage stdout, when the failure is a stage error.
    pub stdout: Option<String>,
}

/// The engine's decision for one test case.
///
/// `HarnessFatal` is not a test result: it reports that the harness itself
/// violated a precondition (bad toolchain command line, failed spawn) and
/// terminates the whole run without being attributed to the case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(FailReport),
    SkippedNoGolden { warning: String },
    HarnessFatal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum VerdictKind {
    #[strum(serialize = "PASS")]
    Pass,
    #[strum(serialize = "FAIL")]
    Fail,
    #[strum(serialize = "SKIP")]
    Skip,
    #[strum(serialize = "FATAL")]
    Fatal,
}

impl Verdict {
    pub fn kind(&self) -> VerdictKind {
        match self {
            Verdict::Pass => VerdictKind::Pass,
            Verdict::Fail(_) => VerdictKind::Fail,
            Verdict::SkippedNoGolden { .. } => VerdictKind::Skip,
            Verdict::HarnessFatal { .. } => VerdictKind::Fatal,
        }
    }
}

/// The first verdict that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunFailure {
    Case { name: String, report: FailReport },
    Fatal { message: String },
}

/// Aggregate of one run. The caller inspects this to decide the process
/// exit status; the library never terminates the process on a verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub executed: usize,
    pub passed: usize,
    /// Warnings recorded for cases skipped for lack of a sample output.
    pub warnings: Vec<String>,
    pub failure: Option<RunFailure>,
}

impl RunResult {
    /// Fold one verdict into the aggregate. Returns `Break` when the run
    /// must stop (fail-fast policy: first `Fail` or `HarnessFatal`).
    pub fn absorb(&mut self, case_name: &str, verdict: Verdict) -> ControlFlow<()> {
        match verdict {
            Verdict::Pass => {
                self.executed += 1;
                self.passed += 1;
                ControlFlow::Continue(())
            }
            Verdict::SkippedNoGolden { warning } => {
                self.executed += 1;
                self.warnings.push(warning);
                ControlFlow::Continue(())
            }
            Verdict::Fail(report) => {
                self.executed += 1;
                self.failure = Some(RunFailure::Case {
                    name: case_name.to_owned(),
                    report,
                });
                ControlFlow::Break(())
            }
            // Not attributed to the case, so not counted as executed.
            Verdict::HarnessFatal { message } => {
                self.failure = Some(RunFailure::Fatal { message });
                ControlFlow::Break(())
            }
        }
    }

    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }
}
