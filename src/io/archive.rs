//! ZIP extraction into a scoped temporary directory.
//!
//! [`extract`] unpacks a barcode archive into a freshly created directory
//! owned by the returned [`ExtractedArchive`]. The directory is removed by
//! [`ExtractedArchive::release`] or, at the latest, when the handle is
//! dropped. Removal failures are logged and never surface as errors.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{Span, debug, info, warn};
use zip::ZipArchive;

use crate::error::AssemblyError;
use crate::utils::collect_pdf_files;

/// Prefix of every extraction directory.
pub const TEMP_DIR_PREFIX: &str = "ozon_barcodes_";

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const EMPTY_ZIP_MAGIC: [u8; 4] = *b"PK\x05\x06";

/// Unpacked archive contents, deleted on release or drop.
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: Option<TempDir>,
    path: PathBuf,
    span: Span,
}

impl ExtractedArchive {
    /// Directory holding the extracted entries.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PDF entries at the top level of the directory, sorted by file name.
    pub fn pdf_files(&self) -> Vec<PathBuf> {
        if self.is_released() {
            return Vec::new();
        }
        collect_pdf_files(&self.path)
    }

    /// Whether the directory has already been removed.
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Recursively delete the directory. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        let _entered = self.span.enter();
        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "temporary directory removed"),
            Err(err) => warn!(
                path = %self.path.display(),
                %err,
                "failed to remove temporary directory"
            ),
        }
    }
}

impl Drop for ExtractedArchive {
    fn drop(&mut self) {
        self.release();
    }
}

/// Unpack `zip_path` into a new temporary directory.
///
/// # Errors
///
/// - [`AssemblyError::ArchiveNotFound`] if the path does not exist
/// - [`AssemblyError::NotAnArchive`] if the file is not a ZIP container
/// - [`AssemblyError::CorruptArchive`] if it looks like one but cannot be read
///   or unpacked
/// - [`AssemblyError::TempDir`] if the scratch directory cannot be created
pub fn extract(zip_path: &Path) -> Result<ExtractedArchive, AssemblyError> {
    let file = open_archive(zip_path)?;
    let zip_like = has_zip_signature(zip_path);

    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|err| {
        if zip_like {
            AssemblyError::CorruptArchive {
                path: zip_path.to_path_buf(),
                reason: err.to_string(),
            }
        } else {
            AssemblyError::NotAnArchive {
                path: zip_path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    })?;

    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .map_err(|source| AssemblyError::TempDir { source })?;

    let extracted = ExtractedArchive {
        path: dir.path().to_path_buf(),
        dir: Some(dir),
        span: Span::current(),
    };

    // On failure `extracted` is dropped here, which removes the partial tree.
    archive
        .extract(extracted.path())
        .map_err(|err| AssemblyError::CorruptArchive {
            path: zip_path.to_path_buf(),
            reason: err.to_string(),
        })?;

    info!(
        archive = %zip_path.display(),
        entries = archive.len(),
        pdf_files = extracted.pdf_files().len(),
        dir = %extracted.path().display(),
        "archive extracted"
    );

    Ok(extracted)
}

fn open_archive(zip_path: &Path) -> Result<File, AssemblyError> {
    if zip_path.is_dir() {
        return Err(AssemblyError::NotAnArchive {
            path: zip_path.to_path_buf(),
            reason: "path is a directory".to_string(),
        });
    }

    File::open(zip_path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => AssemblyError::ArchiveNotFound {
            path: zip_path.to_path_buf(),
        },
        _ => AssemblyError::NotAnArchive {
            path: zip_path.to_path_buf(),
            reason: err.to_string(),
        },
    })
}

fn has_zip_signature(zip_path: &Path) -> bool {
    let mut magic = [0u8; 4];
    File::open(zip_path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .is_ok_and(|()| magic == ZIP_MAGIC || magic == EMPTY_ZIP_MAGIC)
}
