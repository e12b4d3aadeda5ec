// Validate command - check a benchmark record without writing anything

use std::path::Path;

use anyhow::{Context, Result};
use awardbench_core::{load_or_sample, AssemblerConfig, Validated};
use serde::Serialize;

use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Debug, Serialize)]
struct ValidationSummary {
    valid: bool,
    timestamp: String,
    leader: String,
    leader_score: f64,
    entries: usize,
    metrics: Vec<String>,
}

impl ValidationSummary {
    fn from_record(record: &Validated<'_>) -> Self {
        Self {
            valid: true,
            timestamp: record.result().timestamp.to_rfc3339(),
            leader: record.leader().name.clone(),
            leader_score: record.leader().overall_score,
            entries: record.entries().len(),
            metrics: record.metrics().map(|(key, _)| key.to_string()).collect(),
        }
    }
}

pub fn run(data: Option<&Path>, output: OutputFormat, quiet: bool) -> Result<()> {
    let config = AssemblerConfig::from_env();
    let data = data.or(config.data_file.as_deref());

    let result = load_or_sample(data).context("Failed to load benchmark record")?;
    let record = result
        .validate()
        .context("Benchmark record is not renderable")?;
    let summary = ValidationSummary::from_record(&record);

    if !output.is_text() {
        return output.print_value(&summary);
    }
    if quiet {
        return Ok(());
    }

    let source = data.map_or_else(|| "built-in sample".to_string(), |p| p.display().to_string());
    print_field("Record", &source);
    print_field("Timestamp", &summary.timestamp);
    print_field(
        "Leader",
        &format!("{} ({:.3})", summary.leader, summary.leader_score),
    );
    print_field("Metrics", &summary.metrics.join(", "));
    println!();

    print_table_header(&[("RANK", 5), ("MODEL", 28), ("OVERALL", 8)]);
    for (idx, entry) in record.entries().iter().enumerate() {
        print_table_row(&[
            (&(idx + 1).to_string(), 5),
            (&entry.name, 28),
            (&format!("{:.3}", entry.overall_score), 8),
        ]);
    }

    Ok(())
}
