//! Filesystem side of the assembler: archive extraction, PDF loading and
//! PDF writing.

pub mod archive;
pub mod reader;
pub mod writer;

pub use archive::{ExtractedArchive, extract};
pub use reader::{LoadedPdf, PdfReader, UnusablePdf};
pub use writer::{PdfWriter, WriteStatistics};
