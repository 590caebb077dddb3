//! Sequential fail-fast run loop.
//!
//! One case at a time, each attempted at most once, in the order given by
//! discovery. The first `Fail` or `HarnessFatal` verdict stops the run;
//! `SkippedNoGolden` is recorded and the run continues. Driver errors (the
//! toolchain itself failed to run) surface as `HarnessFatal`.

use super::case::TestCase;
use super::engine::{self, CompileJudgment};
use super::outcome::{RunResult, Verdict};
use super::runner::{SuiteMode, ToolchainDriver};

/// Run `cases` through `driver` and fold verdicts into a `RunResult`.
///
/// `observer` sees every `(case, verdict)` pair as it is decided, so the
/// caller can render progress without this loop printing anything.
pub async fn orchestrate<D, F>(
    driver: &D,
    mode: SuiteMode,
    cases: &[TestCase],
    mut observer: F,
) -> RunResult
where
    D: ToolchainDriver + Sync,
    F: FnMut(&TestCase, &Verdict),
{
    let mut result = RunResult::default();
    for case in cases {
        let verdict = run_case(driver, mode, case).await.unwrap_or_else(|e| {
            Verdict::HarnessFatal {
                message: format!("{:#}", e),
            }
        });
        observer(case, &verdict);
        if result.absorb(case.name(), verdict).is_break() {
            break;
        }
    }
    result
}

async fn run_case<D>(driver: &D, mode: SuiteMode, case: &TestCase) -> anyhow::Result<Verdict>
where
    D: ToolchainDriver + Sync,
{
    match mode {
        SuiteMode::Single => {
            // Discovery guarantees the golden file for this suite kind.
            let golden_path = case.golden_file().ok_or_else(|| {
                anyhow::anyhow!("{} does not have a sample output file", case.name())
            })?;
            let golden = fsutil::read(golden_path)?;
            let outcome = driver.run_single(case).await?;
            Ok(engine::evaluate_single(case, &outcome, &golden))
        }
        SuiteMode::CompileEmulate => {
            let compile = driver.compile(case).await?;
            match engine::judge_compile(case, &compile) {
                CompileJudgment::Settled(verdict) => Ok(verdict),
                CompileJudgment::NeedsEmulation => {
                    // Stdin is piped iff the case has an input file; decided
                    // here once, independent of category.
                    let stdin = case.stdin_file().map(fsutil::read).transpose()?;
                    let emulate = driver.emulate(case, stdin.as_deref()).await?;
                    let golden = case.golden_file().map(fsutil::read).transpose()?;
                    Ok(engine::judge_emulation(
                        case,
                        &compile,
                        &emulate,
                        golden.as_deref(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use anyhow::{bail, Context};
    use async_trait::async_trait;

    use super::*;
    use crate::testing::outcome::{exit_code, RunFailure, StageOutcome};

    /// Driver returning pre-scripted outcomes by case name.
    #[derive(Default)]
    struct ScriptedToolchain {
        compile: HashMap<String, StageOutcome>,
        emulate: HashMap<String, StageOutcome>,
    }

    impl ScriptedToolchain {
        fn with_compile(mut self, name: &str, outcome: StageOutcome) -> Self {
            self.compile.insert(name.to_owned(), outcome);
            self
        }

        fn with_emulate(mut self, name: &str, outcome: StageOutcome) -> Self {
            self.emulate.insert(name.to_owned(), outcome);
            self
        }
    }

    #[async_trait]
    impl ToolchainDriver for ScriptedToolchain {
        async fn compile(&self, case: &TestCase) -> anyhow::Result<StageOutcome> {
            self.compile
                .get(case.name())
                .cloned()
                .with_context(|| format!("no scripted compile outcome for {}", case.name()))
        }

        async fn emulate(
            &self,
            case: &TestCase,
            _stdin: Option<&[u8]>,
        ) -> anyhow::Result<StageOutcome> {
            self.emulate
                .get(case.name())
                .cloned()
                .with_context(|| format!("no scripted emulate outcome for {}", case.name()))
        }

        async fn run_single(&self, _case: &TestCase) -> anyhow::Result<StageOutcome> {
            bail!("single stage not scripted")
        }
    }

    fn case(name: &str) -> TestCase {
        TestCase::from_source_path(format!("testdata/compiler/{}.gt", name)).unwrap()
    }

    #[tokio::test]
    async fn run_stops_at_the_first_failing_case() {
        let driver = ScriptedToolchain::default()
            .with_compile("w-a", StageOutcome::new(exit_code::OK, Vec::new()))
            .with_compile("w-b", StageOutcome::new(exit_code::SYNTAX_ERROR, Vec::new()));
        let cases = [case("w-a"), case("w-b")];

        let mut seen = Vec::new();
        let result = orchestrate(&driver, SuiteMode::CompileEmulate, &cases, |c, _| {
            seen.push(c.name().to_owned());
        })
        .await;

        // w-a compiles cleanly although a syntax error was expected; w-b is
        // never attempted.
        assert_eq!(seen, ["w-a"]);
        assert_eq!(result.executed, 1);
        assert!(matches!(
            result.failure,
            Some(RunFailure::Case { ref name, .. }) if name == "w-a"
        ));
    }

    #[tokio::test]
    async fn skipped_cases_do_not_stop_the_run() {
        let driver = ScriptedToolchain::default()
            .with_compile("c-a", StageOutcome::new(exit_code::OK, Vec::new()))
            .with_emulate("c-a", StageOutcome::new(exit_code::OK, b"out\n".to_vec()))
            .with_compile("w-b", StageOutcome::new(exit_code::SYNTAX_ERROR, Vec::new()));
        // c-a has no golden file on disk, so its clean emulation is skipped.
        let cases = [case("c-a"), case("w-b")];

        let result = orchestrate(&driver, SuiteMode::CompileEmulate, &cases, |_, _| {}).await;

        assert!(result.is_pass());
        assert_eq!(result.executed, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("c-a"));
    }

    #[tokio::test]
    async fn cli_arg_error_halts_the_run_as_fatal() {
        let driver = ScriptedToolchain::default()
            .with_compile("c-a", StageOutcome::new(exit_code::CLI_ARG_ERROR, Vec::new()))
            .with_compile("c-b", StageOutcome::new(exit_code::OK, Vec::new()));
        let cases = [case("c-a"), case("c-b")];

        let mut seen = 0;
        let result = orchestrate(&driver, SuiteMode::CompileEmulate, &cases, |_, _| seen += 1).await;

        assert_eq!(seen, 1);
        assert_eq!(result.executed, 0);
        assert!(matches!(result.failure, Some(RunFailure::Fatal { .. })));
    }

    #[tokio::test]
    async fn driver_errors_become_fatal_verdicts() {
        // Nothing scripted: the driver fails to produce a compile outcome.
        let driver = ScriptedToolchain::default();
        let cases = [case("c-a")];

        let result = orchestrate(&driver, SuiteMode::CompileEmulate, &cases, |_, _| {}).await;

        let Some(RunFailure::Fatal { message }) = result.failure else {
            panic!("expected a fatal failure");
        };
        assert!(message.contains("c-a"), "{}", message);
    }

    #[tokio::test]
    async fn expected_compile_failures_pass_without_emulation() {
        // No emulate outcomes scripted: reaching stage B would error.
        let driver = ScriptedToolchain::default()
            .with_compile("w-a", StageOutcome::new(exit_code::SYNTAX_ERROR, Vec::new()))
            .with_compile("s-b", StageOutcome::new(exit_code::SEMANTIC_ERROR, Vec::new()));
        let cases = [case("w-a"), case("s-b")];

        let result = orchestrate(&driver, SuiteMode::CompileEmulate, &cases, |_, _| {}).await;

        assert!(result.is_pass());
        assert_eq!(result.passed, 2);
    }
}
