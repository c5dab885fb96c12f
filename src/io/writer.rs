//! Writing the assembled PDF.
//!
//! The document is compressed and serialized into a temporary file next to
//! the destination, then renamed into place, so a failed run never leaves a
//! half-written output behind.

use lopdf::Document;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::AssemblyError;

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStatistics {
    /// Where the file was written.
    pub output_path: PathBuf,

    /// Size of the written file in bytes.
    pub file_size: u64,
}

/// PDF writer.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    compress: bool,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    /// Create a writer that compresses content streams.
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// Create a writer that leaves streams as they are.
    pub fn without_compression() -> Self {
        Self { compress: false }
    }

    /// Write `doc` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::FailedToWrite`] if the directory cannot be
    /// created or the file cannot be written or moved into place.
    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics, AssemblyError> {
        let failed = |source: io::Error| AssemblyError::FailedToWrite {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(failed)?;

        if self.compress {
            doc.compress();
        }

        let temp = NamedTempFile::new_in(parent).map_err(failed)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            doc.save_to(&mut writer).map_err(io::Error::other).map_err(failed)?;
            writer.flush().map_err(failed)?;
        }

        temp.persist(path).map_err(|err| failed(err.error))?;

        let file_size = std::fs::metadata(path).map(|m| m.len()).map_err(failed)?;

        Ok(WriteStatistics {
            output_path: path.to_path_buf(),
            file_size,
        })
    }
}
