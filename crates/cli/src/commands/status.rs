// Status command - which artifacts the Paper API has published

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::output::{print_field, OutputFormat};

/// Status from API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperStatus {
    pub tex_available: bool,
    pub pdf_available: bool,
    pub bundle_available: bool,
    pub last_updated: DateTime<Utc>,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "available"
    } else {
        "missing"
    }
}

pub async fn run(client: &Client, output: OutputFormat) -> Result<()> {
    let status: PaperStatus = client.get("/api/paper/status").await?;

    if !output.is_text() {
        return output.print_value(&status);
    }

    print_field("LaTeX", yes_no(status.tex_available));
    print_field("PDF", yes_no(status.pdf_available));
    print_field("Bundle", yes_no(status.bundle_available));
    print_field("Last updated", &status.last_updated.to_rfc3339());

    Ok(())
}
