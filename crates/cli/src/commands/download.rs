// Download command - fetch a published artifact from the Paper API

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::client::{Client, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadFormat {
    Tex,
    Pdf,
    Bundle,
}

impl DownloadFormat {
    fn path_segment(self) -> &'static str {
        match self {
            DownloadFormat::Tex => "tex",
            DownloadFormat::Pdf => "pdf",
            DownloadFormat::Bundle => "bundle",
        }
    }

    /// Local file name used when `--out` is not given
    pub fn default_file_name(self) -> &'static str {
        match self {
            DownloadFormat::Tex => "awardbench_paper.tex",
            DownloadFormat::Pdf => "awardbench_paper.pdf",
            DownloadFormat::Bundle => "awardbench_paper_bundle.zip",
        }
    }
}

pub async fn run(
    client: &Client,
    format: DownloadFormat,
    out: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let path = format!("/api/paper/download/{}", format.path_segment());
    let bytes = match client.get_bytes(&path).await {
        Ok(bytes) => bytes,
        Err(ClientError::Api { status: 500, message }) if format == DownloadFormat::Pdf => {
            anyhow::bail!(
                "PDF not available ({}); the server may not have a LaTeX toolchain",
                message
            );
        }
        Err(e) => return Err(e.into()),
    };

    let out = out.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    if !quiet {
        println!("Saved {} ({} bytes)", out.display(), bytes.len());
    }

    Ok(())
}
