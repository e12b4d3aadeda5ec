// Generate command - assemble the paper locally

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use awardbench_core::{
    load_or_sample, AssemblerConfig, AssemblyOutcome, ReportAssembler, StepStatus,
};
use serde::Serialize;

use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

/// Flags that override the environment configuration
#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub data: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub no_compile: bool,
    pub no_bundle: bool,
}

impl GenerateArgs {
    fn apply(self, mut config: AssemblerConfig) -> AssemblerConfig {
        if let Some(data) = self.data {
            config.data_file = Some(data);
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if self.no_compile {
            config.compile = false;
        }
        if self.no_bundle {
            config.bundle = false;
        }
        config
    }
}

#[derive(Debug, Serialize)]
struct StepSummary {
    step: String,
    attempts: u32,
    status: String,
}

#[derive(Debug, Serialize)]
struct GenerateSummary {
    document: String,
    bibliography: String,
    compiled: Option<String>,
    bundle: Option<String>,
    steps: Vec<StepSummary>,
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn describe(status: &StepStatus) -> String {
    match status {
        StepStatus::Succeeded => "ok".to_string(),
        StepStatus::Tolerated { exit_code } => match exit_code {
            Some(code) => format!("warnings (exit {})", code),
            None => "warnings".to_string(),
        },
        StepStatus::Failed { exit_code } => match exit_code {
            Some(code) => format!("failed (exit {})", code),
            None => "failed (killed)".to_string(),
        },
        StepStatus::Unavailable { reason } => format!("unavailable: {}", reason),
    }
}

impl From<&AssemblyOutcome> for GenerateSummary {
    fn from(outcome: &AssemblyOutcome) -> Self {
        let steps = outcome
            .compile_report
            .as_ref()
            .map(|report| {
                report
                    .steps
                    .iter()
                    .map(|record| StepSummary {
                        step: record.step.to_string(),
                        attempts: record.attempts,
                        status: describe(&record.status),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            document: display(&outcome.document),
            bibliography: display(&outcome.bibliography),
            compiled: outcome.compiled.as_deref().map(display),
            bundle: outcome.bundle.as_deref().map(display),
            steps,
        }
    }
}

fn log_outcome(outcome: &AssemblyOutcome) {
    if let Some(halted) = outcome
        .compile_report
        .as_ref()
        .and_then(|report| report.halted_at())
    {
        tracing::warn!(
            step = %halted.step,
            attempts = halted.attempts,
            status = %describe(&halted.status),
            "Typesetting stopped; keeping LaTeX sources only"
        );
    }
    tracing::info!(
        document = %outcome.document.display(),
        pdf = outcome.compiled.is_some(),
        bundled = outcome.bundle.is_some(),
        "Paper assembled"
    );
}

pub async fn run(args: GenerateArgs, output: OutputFormat, quiet: bool) -> Result<()> {
    let config = args.apply(AssemblerConfig::from_env());

    let record = load_or_sample(config.data_file.as_deref())
        .context("Failed to load benchmark record")?;
    let assembler = ReportAssembler::new(&config)?;
    let outcome = assembler
        .assemble(&record, &config.output_dir)
        .await
        .context("Failed to generate paper")?;
    log_outcome(&outcome);
    let summary = GenerateSummary::from(&outcome);

    if !output.is_text() {
        return output.print_value(&summary);
    }
    if quiet {
        return Ok(());
    }

    print_field("LaTeX", &summary.document);
    print_field("Bibliography", &summary.bibliography);
    print_field(
        "PDF",
        summary
            .compiled
            .as_deref()
            .unwrap_or("not produced (LaTeX toolchain unavailable or failed)"),
    );
    print_field("Bundle", summary.bundle.as_deref().unwrap_or("-"));

    if !summary.steps.is_empty() {
        println!();
        print_table_header(&[("STEP", 20), ("ATTEMPTS", 8), ("STATUS", 40)]);
        for step in &summary.steps {
            print_table_row(&[
                (&step.step, 20),
                (&step.attempts.to_string(), 8),
                (&step.status, 40),
            ]);
        }
    }

    Ok(())
}
