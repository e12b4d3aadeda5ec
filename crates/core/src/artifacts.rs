//! Writing the paper source and bibliography to disk
//!
//! Both files are written as a pair. Each is staged in the target directory and
//! renamed into place; if the second rename fails the first is rolled back, so
//! readers see either the previous pair or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};

use crate::error::{AssemblyError, Result};

/// LaTeX source file name
pub const DOCUMENT_FILE: &str = "awardbench_paper.tex";
/// Bibliography file name; the document references it as `references`
pub const BIBLIOGRAPHY_FILE: &str = "references.bib";
/// Typeset output produced next to the source
pub const COMPILED_FILE: &str = "awardbench_paper.pdf";
/// Staging directory for the bundle
pub const BUNDLE_DIR: &str = "awardbench_paper_bundle";
/// Bundle archive file name
pub const BUNDLE_ARCHIVE: &str = "awardbench_paper.zip";

/// Fixed bibliography shipped with every paper
pub const BIBLIOGRAPHY: &str = include_str!("../templates/references.bib");

const STAGING_PREFIX: &str = ".awardbench-";

/// Locations of a written source pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub document: PathBuf,
    pub bibliography: PathBuf,
}

impl ArtifactPaths {
    /// Where the pair lives (or would live) inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            document: dir.join(DOCUMENT_FILE),
            bibliography: dir.join(BIBLIOGRAPHY_FILE),
        }
    }
}

/// Write `text` and the bibliography into `dir`, creating it if needed
///
/// Existing files are overwritten. On failure neither file is left half
/// written and a pre-existing document is restored.
pub fn write_artifacts(text: &str, dir: &Path) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir).map_err(AssemblyError::io("create directory", dir))?;
    let paths = ArtifactPaths::in_dir(dir);

    let document = stage(dir, text, &paths.document)?;
    let bibliography = stage(dir, BIBLIOGRAPHY, &paths.bibliography)?;
    let previous = stash(dir, &paths.document)?;

    document.persist(&paths.document).map_err(|err| {
        AssemblyError::io("replace", &paths.document)(err.error)
    })?;

    if let Err(err) = bibliography.persist(&paths.bibliography) {
        rollback(&paths.document, previous);
        return Err(AssemblyError::io("replace", &paths.bibliography)(err.error));
    }

    tracing::info!(
        document = %paths.document.display(),
        bibliography = %paths.bibliography.display(),
        "Wrote paper sources"
    );

    Ok(paths)
}

/// Write `contents` to a synced temp file in `dir`
fn stage(dir: &Path, contents: &str, target: &Path) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .map_err(AssemblyError::io("stage", target))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.as_file().sync_all())
        .map_err(AssemblyError::io("write", target))?;
    Ok(file)
}

/// Copy the current file at `path` aside so it can be restored
fn stash(dir: &Path, path: &Path) -> Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let stash = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)
        .map_err(AssemblyError::io("stash", path))?
        .into_temp_path();
    fs::copy(path, &stash).map_err(AssemblyError::io("stash", path))?;
    Ok(Some(stash))
}

fn rollback(document: &Path, previous: Option<TempPath>) {
    let restored = match previous {
        Some(stash) => stash.persist(document).map_err(|err| err.error),
        None => fs::remove_file(document),
    };
    if let Err(err) = restored {
        tracing::error!(
            path = %document.display(),
            error = %err,
            "Failed to roll back paper source"
        );
    }
}
