// Report Assembler
//
// Turns a benchmark-result record into the AwardBench paper: LaTeX source plus
// bibliography, optionally a typeset PDF, and a zip bundle of both.
//
// Key design decisions:
// - Rendering only accepts a validated record, so missing metrics fail up front
// - The LaTeX skeleton is a minijinja template; numbers are formatted in Rust
// - The source pair is written atomically (staged files renamed into place)
// - Typesetting runs as an explicit step sequence behind the CommandRunner trait
// - Toolchain failures degrade to "no PDF" and never fail an assembly

pub mod artifacts;
pub mod assembler;
pub mod bundle;
pub mod compile;
pub mod config;
pub mod data;
pub mod error;
pub mod latex;
pub mod render;
pub mod retry;

pub use artifacts::{
    write_artifacts, ArtifactPaths, BIBLIOGRAPHY, BIBLIOGRAPHY_FILE, BUNDLE_ARCHIVE, BUNDLE_DIR,
    COMPILED_FILE, DOCUMENT_FILE,
};
pub use assembler::{AssemblyOutcome, ReportAssembler};
pub use bundle::bundle;
pub use compile::{
    CommandOutput, CommandRunner, CompileReport, CompileStep, Compiler, CompilerConfig,
    Invocation, ProcessRunner, StepRecord, StepStatus, ToolchainError,
};
pub use config::AssemblerConfig;
pub use data::{load_benchmark_result, load_or_sample, sample_benchmark_result};
pub use error::{AssemblyError, RenderError, Result};
pub use render::{render, render_appendix, render_table, PaperConfig, PaperRenderer};
pub use retry::RetryPolicy;

// Re-export the record types so callers need only this crate
pub use awardbench_schemas::{
    BenchmarkResult, MetricDescriptor, ModelEntry, Validated, ValidationError,
};
