//! Packaging the paper files into a single archive

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifacts::{BUNDLE_ARCHIVE, BUNDLE_DIR};
use crate::error::{AssemblyError, Result};

/// Gather the source pair (and the PDF, when there is one) into an archive
///
/// The files are first copied into a fresh staging directory next to the
/// document, then zipped flat under their own names. The archive lands next to
/// the document and replaces any previous one.
pub fn bundle(document: &Path, bibliography: &Path, compiled: Option<&Path>) -> Result<PathBuf> {
    let out_dir = match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let staging = out_dir.join(BUNDLE_DIR);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(AssemblyError::io("clear", &staging))?;
    }
    fs::create_dir_all(&staging).map_err(AssemblyError::io("create directory", &staging))?;

    let mut members = vec![document, bibliography];
    members.extend(compiled);

    let mut entries = Vec::with_capacity(members.len());
    for source in members {
        let name = source
            .file_name()
            .ok_or_else(|| AssemblyError::Io {
                action: "bundle",
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            })?
            .to_string_lossy()
            .into_owned();
        let staged = staging.join(&name);
        fs::copy(source, &staged).map_err(AssemblyError::io("copy", source))?;
        entries.push((name, staged));
    }

    let archive = out_dir.join(BUNDLE_ARCHIVE);
    let temp = tempfile::Builder::new()
        .prefix(".awardbench-")
        .tempfile_in(&out_dir)
        .map_err(AssemblyError::io("stage", &archive))?;

    let file = write_archive(temp.reopen().map_err(AssemblyError::io("stage", &archive))?, &entries)
        .map_err(|source| AssemblyError::Archive {
            path: archive.clone(),
            source,
        })?;
    file.sync_all().map_err(AssemblyError::io("write", &archive))?;
    temp.persist(&archive)
        .map_err(|err| AssemblyError::io("replace", &archive)(err.error))?;

    tracing::info!(
        archive = %archive.display(),
        files = entries.len(),
        "Bundled paper"
    );

    Ok(archive)
}

fn write_archive(file: File, entries: &[(String, PathBuf)]) -> zip::result::ZipResult<File> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&fs::read(path)?)?;
    }

    zip.finish()
}
