//! Loading barcode PDFs.
//!
//! A barcode file is either usable (parses and has at least one page) or it
//! is not. Unusable files are not errors of the run: the merge records them
//! and moves on.

use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A parsed PDF with at least one page.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,
}

/// Why a barcode file cannot contribute pages.
#[derive(Debug, Error)]
pub enum UnusablePdf {
    #[error("failed to parse {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("{} has no pages", .path.display())]
    NoPages { path: PathBuf },
}

/// Loads barcode PDFs from disk.
pub struct PdfReader;

impl PdfReader {
    /// Load `path` and check that it has pages.
    pub fn load(path: &Path) -> Result<LoadedPdf, UnusablePdf> {
        let document = Document::load(path).map_err(|err| UnusablePdf::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(UnusablePdf::NoPages {
                path: path.to_path_buf(),
            });
        }

        Ok(LoadedPdf {
            document,
            path: path.to_path_buf(),
            page_count,
        })
    }
}
