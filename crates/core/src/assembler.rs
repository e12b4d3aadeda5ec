//! End-to-end paper assembly
//!
//! render -> write sources -> typeset (optional) -> bundle (optional)

use std::path::{Path, PathBuf};

use awardbench_schemas::BenchmarkResult;

use crate::artifacts::write_artifacts;
use crate::bundle::bundle;
use crate::compile::{CommandRunner, CompileReport, Compiler, ProcessRunner};
use crate::config::AssemblerConfig;
use crate::error::Result;
use crate::render::PaperRenderer;

/// Paths produced by one assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOutcome {
    pub document: PathBuf,
    pub bibliography: PathBuf,
    /// Present only when typesetting produced a PDF
    pub compiled: Option<PathBuf>,
    /// Present when bundling is enabled
    pub bundle: Option<PathBuf>,
    /// `None` when typesetting was disabled
    pub compile_report: Option<CompileReport>,
}

/// Renders, writes, typesets and bundles papers
pub struct ReportAssembler<R = ProcessRunner> {
    renderer: PaperRenderer,
    compiler: Compiler<R>,
    compile: bool,
    bundle: bool,
}

impl ReportAssembler<ProcessRunner> {
    pub fn new(config: &AssemblerConfig) -> Result<Self> {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: CommandRunner> ReportAssembler<R> {
    pub fn with_runner(config: &AssemblerConfig, runner: R) -> Result<Self> {
        Ok(Self {
            renderer: PaperRenderer::new(config.paper.clone())?,
            compiler: Compiler::with_runner(config.compiler.clone(), runner),
            compile: config.compile,
            bundle: config.bundle,
        })
    }

    pub fn renderer(&self) -> &PaperRenderer {
        &self.renderer
    }

    /// Produce every artifact for `result` in `output_dir`
    ///
    /// Invalid records and filesystem failures abort; typesetting problems only
    /// mean `compiled` is `None`.
    pub async fn assemble(
        &self,
        result: &BenchmarkResult,
        output_dir: &Path,
    ) -> Result<AssemblyOutcome> {
        let record = result.validate()?;
        let text = self.renderer.render_validated(&record)?;
        let paths = write_artifacts(&text, output_dir)?;

        let (compiled, compile_report) = if self.compile {
            let report = self.compiler.compile_with_report(&paths.document).await;
            (report.artifact.clone(), Some(report))
        } else {
            tracing::debug!("Typesetting disabled; writing sources only");
            (None, None)
        };

        let archive = if self.bundle {
            Some(bundle(
                &paths.document,
                &paths.bibliography,
                compiled.as_deref(),
            )?)
        } else {
            None
        };

        tracing::info!(
            output_dir = %output_dir.display(),
            leader = %record.leader().name,
            compiled = compiled.is_some(),
            bundled = archive.is_some(),
            "Assembled paper"
        );

        Ok(AssemblyOutcome {
            document: paths.document,
            bibliography: paths.bibliography,
            compiled,
            bundle: archive,
            compile_report,
        })
    }
}
