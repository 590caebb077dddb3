use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use super::case::TestCase;
use super::outcome::StageOutcome;
use crate::str_interp::interp;

/// Commands of one suite, as rendered-per-case `#{var}` templates.
/// `#{source}` and `#{name}` are always defined; `#{artifact}` only for the
/// compile/emulate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteCommand {
    /// One stage whose stdout is diffed directly against the golden file.
    Single { run: String },
    /// Compile writing an artifact, then emulate executing it.
    CompileEmulate {
        compile: String,
        emulate: String,
        artifact_ext: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteMode {
    Single,
    CompileEmulate,
}

impl SuiteCommand {
    pub fn mode(&self) -> SuiteMode {
        match self {
            SuiteCommand::Single { .. } => SuiteMode::Single,
            SuiteCommand::CompileEmulate { .. } => SuiteMode::CompileEmulate,
        }
    }
}

/// Invokes external stages and reports what they did. The orchestrator only
/// sees this trait, so tests drive it with scripted outcomes instead of
/// real processes.
#[async_trait]
pub trait ToolchainDriver {
    /// Stage A: compile the case's source, writing the artifact file.
    /// Stdout goes into the artifact, so the outcome carries none.
    async fn compile(&self, case: &TestCase) -> anyhow::Result<StageOutcome>;

    /// Stage B: execute the compiled artifact, optionally feeding `stdin`,
    /// capturing stdout.
    async fn emulate(&self, case: &TestCase, stdin: Option<&[u8]>) -> anyhow::Result<StageOutcome>;

    /// The only stage of a single-stage suite, stdout captured.
    async fn run_single(&self, case: &TestCase) -> anyhow::Result<StageOutcome>;
}

/// Runs suite commands through a shell, one at a time.
///
/// There is no timeout: a stage that never terminates stalls the whole run.
#[derive(Debug, Clone)]
pub struct ShellToolchain {
    shell: PathBuf,
    cmd: SuiteCommand,
}

impl ShellToolchain {
    pub const DEFAULT_SHELL: &str = "/bin/sh";

    pub fn new(cmd: SuiteCommand) -> Self {
        Self {
            shell: Self::DEFAULT_SHELL.into(),
            cmd,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    fn render(&self, template: &str, case: &TestCase, artifact: Option<&Path>) -> anyhow::Result<String> {
        let mut vars: HashMap<&'static str, OsString> = HashMap::new();
        vars.insert("source", case.source().as_os_str().to_owned());
        vars.insert("name", case.name().into());
        if let Some(artifact) = artifact {
            vars.insert("artifact", artifact.as_os_str().to_owned());
        }
        interp(template, &vars)
            .with_context(|| format!("Bad command template '{}'", template))
    }

    /// Spawn `shell -c cmd`, optionally piping `stdin` in, capturing stdout.
    /// Stderr passes through to the console.
    async fn capture(&self, cmd: &str, stdin: Option<&[u8]>) -> anyhow::Result<StageOutcome> {
        log::debug!("Running: {}", cmd);
        let mut proc = Command::new(&self.shell)
            .args(["-c", cmd])
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!("Failed to spawn '{} -c {}'", self.shell.to_string_lossy(), cmd)
            })?;

        if let Some(bytes) = stdin {
            let mut pipe = proc.stdin.take().context("Failed to open stdin")?;
            pipe.write_all(bytes)
                .await
                .context("Failed to pass input-data to stdin")?;
            // Closing the pipe; the stage would otherwise block waiting for EOF.
            drop(pipe);
        }

        let output = proc
            .wait_with_output()
            .await
            .context("Failed to communicate with subprocess")?;
        Ok(StageOutcome::new(
            output.status.code().unwrap_or(-1),
            output.stdout,
        ))
    }
}

#[async_trait]
impl ToolchainDriver for ShellToolchain {
    async fn compile(&self, case: &TestCase) -> anyhow::Result<StageOutcome> {
        let SuiteCommand::CompileEmulate {
            compile,
            artifact_ext,
            ..
        } = &self.cmd
        else {
            bail!("No compile command configured for this suite");
        };

        let artifact = case.artifact_path(artifact_ext);
        let cmd = self.render(compile, case, Some(&artifact))?;
        log::debug!("Compiling: {}", cmd);

        let artifact_file = fsutil::create_file(&artifact)?;
        let status = Command::new(&self.shell)
            .args(["-c", &cmd])
            .stdin(Stdio::null())
            .stdout(Stdio::from(artifact_file))
            .status()
            .await
            .with_context(|| {
                format!("Failed to spawn '{} -c {}'", self.shell.to_string_lossy(), cmd)
            })?;

        Ok(StageOutcome::new(status.code().unwrap_or(-1), Vec::new()))
    }

    async fn emulate(&self, case: &TestCase, stdin: Option<&[u8]>) -> anyhow::Result<StageOutcome> {
        let SuiteCommand::CompileEmulate {
            emulate,
            artifact_ext,
            ..
        } = &self.cmd
        else {
            bail!("No emulate command configured for this suite");
        };
        let artifact = case.artifact_path(artifact_ext);
        let cmd = self.render(emulate, case, Some(&artifact))?;
        self.capture(&cmd, stdin).await
    }

    async fn run_single(&self, case: &TestCase) -> anyhow::Result<StageOutcome> {
        let SuiteCommand::Single { run } = &self.cmd else {
            bail!("No single-stage command configured for this suite");
        };
        let cmd = self.render(run, case, None)?;
        self.capture(&cmd, None).await
    }
}
