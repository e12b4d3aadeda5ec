// Render command - print the LaTeX source to stdout

use std::path::Path;

use anyhow::{Context, Result};
use awardbench_core::{load_or_sample, AssemblerConfig, PaperRenderer};

pub fn run(data: Option<&Path>) -> Result<()> {
    let config = AssemblerConfig::from_env();
    let data = data.or(config.data_file.as_deref());

    let record = load_or_sample(data).context("Failed to load benchmark record")?;
    let renderer = PaperRenderer::new(config.paper)?;
    let text = renderer.render(&record).context("Failed to render paper")?;

    print!("{}", text);
    Ok(())
}
