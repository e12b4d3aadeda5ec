// Loading benchmark records

use std::path::Path;

use awardbench_schemas::BenchmarkResult;

use crate::error::{AssemblyError, Result};

const SAMPLE_RECORD: &str = include_str!("../data/sample_benchmark.json");

/// Read and parse a record from a JSON file
///
/// Only the shape is checked here; rendering validates the contents.
pub fn load_benchmark_result(path: &Path) -> Result<BenchmarkResult> {
    let text = std::fs::read_to_string(path).map_err(AssemblyError::io("read", path))?;
    BenchmarkResult::from_json(&text).map_err(|source| AssemblyError::Record {
        path: path.to_path_buf(),
        source,
    })
}

/// The built-in leaderboard used when no record file is configured
pub fn sample_benchmark_result() -> Result<BenchmarkResult> {
    BenchmarkResult::from_json(SAMPLE_RECORD).map_err(|source| AssemblyError::Record {
        path: "<built-in sample>".into(),
        source,
    })
}

/// Load `path` if given, otherwise the built-in sample
pub fn load_or_sample(path: Option<&Path>) -> Result<BenchmarkResult> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading benchmark record");
            load_benchmark_result(path)
        }
        None => sample_benchmark_result(),
    }
}
