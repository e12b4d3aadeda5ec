//! Typesetting the paper with an external LaTeX toolchain
//!
//! The build is a fixed sequence: three typesetter passes around one
//! bibliography pass, then a final typesetter pass. Every step runs in the
//! document's directory. Any failure short of a missing PDF is recorded in a
//! [`CompileReport`]; callers only ever see "PDF produced" or "no PDF".

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::retry::RetryPolicy;

/// One step of the typesetting sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStep {
    FirstPass,
    SecondPass,
    /// Bibliography tool run on the document stem
    ResolveReferences,
    ThirdPass,
    FinalPass,
}

impl CompileStep {
    /// The full sequence, in execution order
    pub const SEQUENCE: [CompileStep; 5] = [
        CompileStep::FirstPass,
        CompileStep::SecondPass,
        CompileStep::ResolveReferences,
        CompileStep::ThirdPass,
        CompileStep::FinalPass,
    ];

    pub fn first() -> Self {
        CompileStep::FirstPass
    }

    pub fn next(self) -> Option<Self> {
        match self {
            CompileStep::FirstPass => Some(CompileStep::SecondPass),
            CompileStep::SecondPass => Some(CompileStep::ResolveReferences),
            CompileStep::ResolveReferences => Some(CompileStep::ThirdPass),
            CompileStep::ThirdPass => Some(CompileStep::FinalPass),
            CompileStep::FinalPass => None,
        }
    }

    /// Whether the step runs the typesetter (as opposed to the bibliography tool)
    pub fn is_typesetting_pass(self) -> bool {
        !matches!(self, CompileStep::ResolveReferences)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompileStep::FirstPass => "first_pass",
            CompileStep::SecondPass => "second_pass",
            CompileStep::ResolveReferences => "resolve_references",
            CompileStep::ThirdPass => "third_pass",
            CompileStep::FinalPass => "final_pass",
        }
    }
}

impl fmt::Display for CompileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved external command for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: CompileStep,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// What a finished command reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Tail of combined stdout/stderr, for logging
    pub diagnostics: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Failures to run a command at all
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("{program} is not installed or not on PATH")]
    NotFound { program: String },

    #[error("{program} did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolchainError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ToolchainError::TimedOut { .. } | ToolchainError::Spawn { .. }
        )
    }
}

/// Runs toolchain commands
///
/// [`ProcessRunner`] spawns real processes; tests substitute a scripted runner.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ToolchainError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    async fn run(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ToolchainError> {
        (**self).run(invocation, limit).await
    }
}

/// Keep this many bytes of tool output for diagnostics
const DIAGNOSTICS_TAIL: usize = 2048;

/// Spawns toolchain commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ToolchainError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(limit, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolchainError::NotFound {
                    program: invocation.program.clone(),
                });
            }
            Ok(Err(source)) => {
                return Err(ToolchainError::Spawn {
                    program: invocation.program.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(ToolchainError::TimedOut {
                    program: invocation.program.clone(),
                    limit,
                });
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            exit_code: output.status.code(),
            diagnostics: tail(&combined, DIAGNOSTICS_TAIL).to_string(),
        })
    }
}

fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Toolchain settings
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Typesetter program, e.g. `pdflatex`
    pub typesetter: String,
    /// Bibliography program, e.g. `bibtex`
    pub bibliography_tool: String,
    /// Upper bound for each step
    pub step_timeout: Duration,
    /// Applied to transient failures only
    pub retry: RetryPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            typesetter: "pdflatex".to_string(),
            bibliography_tool: "bibtex".to_string(),
            step_timeout: Duration::from_secs(60),
            retry: RetryPolicy::no_retry(),
        }
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    /// Non-zero exit that does not stop the sequence
    Tolerated { exit_code: Option<i32> },
    /// Non-zero exit from a typesetting pass; the sequence stops
    Failed { exit_code: Option<i32> },
    /// The command could not be run; the sequence stops
    Unavailable { reason: String },
}

impl StepStatus {
    pub fn halts(&self) -> bool {
        matches!(self, StepStatus::Failed { .. } | StepStatus::Unavailable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: CompileStep,
    pub attempts: u32,
    pub status: StepStatus,
}

/// Outcome of a compile, step by step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub steps: Vec<StepRecord>,
    /// The PDF, when every pass succeeded and it exists on disk
    pub artifact: Option<PathBuf>,
}

impl CompileReport {
    /// Step that stopped the sequence, if any
    pub fn halted_at(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|record| record.status.halts())
    }
}

/// Drives the typesetting sequence for one document
pub struct Compiler<R = ProcessRunner> {
    config: CompilerConfig,
    runner: R,
}

impl Compiler<ProcessRunner> {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: CommandRunner> Compiler<R> {
    pub fn with_runner(config: CompilerConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Command for `step` against the document at `document`
    pub fn invocation(&self, step: CompileStep, document: &Path) -> Invocation {
        let working_dir = match document.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (program, args) = if step.is_typesetting_pass() {
            let file_name = document
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            (
                self.config.typesetter.clone(),
                vec!["-interaction=nonstopmode".to_string(), file_name],
            )
        } else {
            let stem = document
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            (self.config.bibliography_tool.clone(), vec![stem])
        };

        Invocation {
            step,
            program,
            args,
            working_dir,
        }
    }

    /// Typeset `document`, returning the PDF path when one was produced
    pub async fn compile(&self, document: &Path) -> Option<PathBuf> {
        self.compile_with_report(document).await.artifact
    }

    /// Typeset `document` and report how each step went
    pub async fn compile_with_report(&self, document: &Path) -> CompileReport {
        let mut report = CompileReport::default();
        let mut next = Some(CompileStep::first());

        while let Some(step) = next {
            let record = self.run_step(step, document).await;
            let halts = record.status.halts();
            report.steps.push(record);
            if halts {
                tracing::warn!(
                    document = %document.display(),
                    step = %step,
                    "Typesetting stopped; continuing without PDF"
                );
                return report;
            }
            next = step.next();
        }

        let pdf = document.with_extension("pdf");
        if pdf.is_file() {
            tracing::info!(pdf = %pdf.display(), "Typeset paper");
            report.artifact = Some(pdf);
        } else {
            tracing::warn!(
                pdf = %pdf.display(),
                "Typesetting finished but produced no PDF"
            );
        }
        report
    }

    async fn run_step(&self, step: CompileStep, document: &Path) -> StepRecord {
        let invocation = self.invocation(step, document);
        let policy = &self.config.retry;
        let mut attempt = 1;

        loop {
            tracing::debug!(
                step = %step,
                program = %invocation.program,
                attempt,
                "Running toolchain step"
            );

            let status = match self.runner.run(&invocation, self.config.step_timeout).await {
                Ok(output) if output.success() => StepStatus::Succeeded,
                Ok(output) => {
                    tracing::debug!(step = %step, diagnostics = %output.diagnostics, "Step output");
                    if step.is_typesetting_pass() {
                        StepStatus::Failed {
                            exit_code: output.exit_code,
                        }
                    } else {
                        tracing::info!(
                            step = %step,
                            exit_code = ?output.exit_code,
                            "Bibliography step reported problems; continuing"
                        );
                        StepStatus::Tolerated {
                            exit_code: output.exit_code,
                        }
                    }
                }
                Err(err) if err.is_retryable() && policy.has_attempts_remaining(attempt) => {
                    attempt += 1;
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        step = %step,
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying toolchain step"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(err) => StepStatus::Unavailable {
                    reason: err.to_string(),
                },
            };

            return StepRecord {
                step,
                attempts: attempt,
                status,
            };
        }
    }
}
