// Assembler Configuration
//
// Configuration for paper generation, loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::compile::CompilerConfig;
use crate::render::PaperConfig;
use crate::retry::RetryPolicy;

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "./paper_output";

/// Everything an assembly needs besides the record itself
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Where artifacts are written
    pub output_dir: PathBuf,

    /// JSON record to render; `None` uses the built-in sample
    pub data_file: Option<PathBuf>,

    /// Run the typesetting toolchain after writing sources
    pub compile: bool,

    /// Zip the artifacts after compiling
    pub bundle: bool,

    pub paper: PaperConfig,

    pub compiler: CompilerConfig,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            data_file: None,
            compile: true,
            bundle: true,
            paper: PaperConfig::default(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl AssemblerConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `AWARDBENCH_OUTPUT_DIR`: Output directory (default: ./paper_output)
    /// - `AWARDBENCH_DATA_FILE`: Benchmark record JSON (default: built-in sample)
    /// - `AWARDBENCH_COMPILE`: Run pdflatex/bibtex (default: true)
    /// - `AWARDBENCH_TYPESETTER`: Typesetter program (default: pdflatex)
    /// - `AWARDBENCH_BIBTEX`: Bibliography program (default: bibtex)
    /// - `AWARDBENCH_COMPILE_TIMEOUT_SECS`: Per-step timeout (default: 60)
    /// - `AWARDBENCH_COMPILE_ATTEMPTS`: Attempts per step on timeout (default: 1)
    /// - `AWARDBENCH_PAPER_DATE`: Fixed date on the title page (default: \today)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let output_dir = lookup("AWARDBENCH_OUTPUT_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);
        let data_file = lookup("AWARDBENCH_DATA_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let compile = lookup("AWARDBENCH_COMPILE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(defaults.compile);

        let mut compiler = defaults.compiler;
        if let Some(typesetter) = lookup("AWARDBENCH_TYPESETTER").filter(|v| !v.is_empty()) {
            compiler.typesetter = typesetter;
        }
        if let Some(tool) = lookup("AWARDBENCH_BIBTEX").filter(|v| !v.is_empty()) {
            compiler.bibliography_tool = tool;
        }
        if let Some(secs) = lookup("AWARDBENCH_COMPILE_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            compiler.step_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = lookup("AWARDBENCH_COMPILE_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|attempts| *attempts > 1)
        {
            compiler.retry = RetryPolicy::exponential().with_max_attempts(attempts);
        }

        let mut paper = defaults.paper;
        paper.date = lookup("AWARDBENCH_PAPER_DATE").filter(|v| !v.is_empty());

        Self {
            output_dir,
            data_file,
            compile,
            bundle: defaults.bundle,
            paper,
            compiler,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = Some(data_file.into());
        self
    }

    pub fn with_compile(mut self, compile: bool) -> Self {
        self.compile = compile;
        self
    }

    pub fn with_bundle(mut self, bundle: bool) -> Self {
        self.bundle = bundle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AssemblerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AssemblerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.output_dir, PathBuf::from("./paper_output"));
        assert_eq!(config.data_file, None);
        assert!(config.compile);
        assert!(config.bundle);
        assert_eq!(config.compiler.typesetter, "pdflatex");
        assert_eq!(config.compiler.bibliography_tool, "bibtex");
        assert_eq!(config.compiler.step_timeout, Duration::from_secs(60));
        assert_eq!(config.compiler.retry, RetryPolicy::no_retry());
        assert_eq!(config.paper.date, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("AWARDBENCH_OUTPUT_DIR", "/tmp/paper"),
            ("AWARDBENCH_DATA_FILE", "results.json"),
            ("AWARDBENCH_COMPILE", "false"),
            ("AWARDBENCH_TYPESETTER", "xelatex"),
            ("AWARDBENCH_BIBTEX", "biber"),
            ("AWARDBENCH_COMPILE_TIMEOUT_SECS", "120"),
            ("AWARDBENCH_COMPILE_ATTEMPTS", "3"),
            ("AWARDBENCH_PAPER_DATE", "January 2025"),
        ]);

        assert_eq!(config.output_dir, PathBuf::from("/tmp/paper"));
        assert_eq!(config.data_file, Some(PathBuf::from("results.json")));
        assert!(!config.compile);
        assert_eq!(config.compiler.typesetter, "xelatex");
        assert_eq!(config.compiler.bibliography_tool, "biber");
        assert_eq!(config.compiler.step_timeout, Duration::from_secs(120));
        assert_eq!(config.compiler.retry.max_attempts, 3);
        assert_eq!(config.paper.date.as_deref(), Some("January 2025"));
    }

    #[test]
    fn test_compile_flag_accepts_one() {
        assert!(config_from(&[("AWARDBENCH_COMPILE", "1")]).compile);
        assert!(config_from(&[("AWARDBENCH_COMPILE", "TRUE")]).compile);
        assert!(!config_from(&[("AWARDBENCH_COMPILE", "no")]).compile);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("AWARDBENCH_COMPILE_TIMEOUT_SECS", "soon"),
            ("AWARDBENCH_COMPILE_ATTEMPTS", "0"),
        ]);

        assert_eq!(config.compiler.step_timeout, Duration::from_secs(60));
        assert_eq!(config.compiler.retry.max_attempts, 1);
    }
}
