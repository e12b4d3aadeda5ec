// Paper service - generation and publishing of paper artifacts
//
// Each generation assembles into a fresh temp dir inside the output dir, then
// renames the results over the published files. The mutex keeps two requests
// from publishing at the same time.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use awardbench_core::{
    load_or_sample, AssemblerConfig, AssemblyError, CommandRunner, ProcessRunner,
    ReportAssembler, Result, BIBLIOGRAPHY_FILE, BUNDLE_ARCHIVE, COMPILED_FILE, DOCUMENT_FILE,
};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Downloadable artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperFormat {
    Tex,
    Pdf,
    Bundle,
}

impl PaperFormat {
    /// Name of the published file in the output dir
    pub fn file_name(self) -> &'static str {
        match self {
            PaperFormat::Tex => DOCUMENT_FILE,
            PaperFormat::Pdf => COMPILED_FILE,
            PaperFormat::Bundle => BUNDLE_ARCHIVE,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PaperFormat::Tex => "text/plain",
            PaperFormat::Pdf => "application/pdf",
            PaperFormat::Bundle => "application/zip",
        }
    }

    /// File name offered to the client
    pub fn download_name(self) -> &'static str {
        match self {
            PaperFormat::Tex => "awardbench_paper.tex",
            PaperFormat::Pdf => "awardbench_paper.pdf",
            PaperFormat::Bundle => "awardbench_paper_bundle.zip",
        }
    }
}

impl FromStr for PaperFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tex" => Ok(PaperFormat::Tex),
            "pdf" => Ok(PaperFormat::Pdf),
            "bundle" => Ok(PaperFormat::Bundle),
            other => Err(format!("Invalid format: {}", other)),
        }
    }
}

/// Which artifacts one generation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generated_at: DateTime<Utc>,
    pub tex: bool,
    pub pdf: bool,
    pub bundle: bool,
}

/// What is currently published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStatus {
    pub tex: bool,
    pub pdf: bool,
    pub bundle: bool,
    pub last_updated: DateTime<Utc>,
}

pub struct PaperService {
    assembler: ReportAssembler<Arc<dyn CommandRunner>>,
    output_dir: PathBuf,
    data_file: Option<PathBuf>,
    lock: Mutex<()>,
}

impl PaperService {
    pub fn new(config: &AssemblerConfig) -> Result<Self> {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: &AssemblerConfig, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        Ok(Self {
            assembler: ReportAssembler::with_runner(config, runner)?,
            output_dir: config.output_dir.clone(),
            data_file: config.data_file.clone(),
            lock: Mutex::new(()),
        })
    }

    /// Assemble the paper and publish every produced file
    pub async fn generate(&self) -> Result<GenerationSummary> {
        let _guard = self.lock.lock().await;
        self.generate_locked().await
    }

    /// Path of a published artifact, generating first if it is missing
    ///
    /// Returns `None` when generation ran but did not produce that artifact
    /// (e.g. no PDF without a TeX installation).
    pub async fn published_file(&self, format: PaperFormat) -> Result<Option<PathBuf>> {
        let path = self.output_dir.join(format.file_name());
        if !path.is_file() {
            let _guard = self.lock.lock().await;
            if !path.is_file() {
                tracing::info!(format = ?format, "Artifact missing; generating paper");
                self.generate_locked().await?;
            }
        }
        Ok(path.is_file().then_some(path))
    }

    pub fn status(&self) -> Result<PublishedStatus> {
        let record = load_or_sample(self.data_file.as_deref())?;
        Ok(PublishedStatus {
            tex: self.output_dir.join(DOCUMENT_FILE).is_file(),
            pdf: self.output_dir.join(COMPILED_FILE).is_file(),
            bundle: self.output_dir.join(BUNDLE_ARCHIVE).is_file(),
            last_updated: record.timestamp,
        })
    }

    async fn generate_locked(&self) -> Result<GenerationSummary> {
        let record = load_or_sample(self.data_file.as_deref())?;

        fs::create_dir_all(&self.output_dir)
            .map_err(AssemblyError::io("create directory", &self.output_dir))?;
        let workspace = tempfile::Builder::new()
            .prefix(".awardbench-")
            .tempdir_in(&self.output_dir)
            .map_err(AssemblyError::io("create directory", &self.output_dir))?;

        let outcome = self.assembler.assemble(&record, workspace.path()).await?;

        self.publish(&outcome.document, DOCUMENT_FILE)?;
        self.publish(&outcome.bibliography, BIBLIOGRAPHY_FILE)?;
        match &outcome.compiled {
            Some(pdf) => self.publish(pdf, COMPILED_FILE)?,
            None => self.unpublish(COMPILED_FILE)?,
        }
        match &outcome.bundle {
            Some(archive) => self.publish(archive, BUNDLE_ARCHIVE)?,
            None => self.unpublish(BUNDLE_ARCHIVE)?,
        }

        tracing::info!(
            output_dir = %self.output_dir.display(),
            pdf = outcome.compiled.is_some(),
            "Published paper"
        );

        Ok(GenerationSummary {
            generated_at: record.timestamp,
            tex: true,
            pdf: outcome.compiled.is_some(),
            bundle: outcome.bundle.is_some(),
        })
    }

    fn publish(&self, source: &Path, name: &str) -> Result<()> {
        let target = self.output_dir.join(name);
        fs::rename(source, &target).map_err(AssemblyError::io("publish", &target))
    }

    /// Remove a file left over from an earlier generation
    fn unpublish(&self, name: &str) -> Result<()> {
        let target = self.output_dir.join(name);
        match fs::remove_file(&target) {
            Ok(()) => {
                tracing::debug!(path = %target.display(), "Removed stale artifact");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AssemblyError::io("remove", &target)(err)),
        }
    }
}
