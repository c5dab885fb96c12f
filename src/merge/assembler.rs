//! The PDF assembler.
//!
//! Owns the three file-side operations of a run: unpacking the barcode
//! archive, merging barcode pages into one print-ready document, and handing
//! that document to a printer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Span, debug, error, info, info_span, warn};

use crate::error::AssemblyError;
use crate::io::{ExtractedArchive, PdfReader, PdfWriter, archive};
use crate::merge::locate::locate;
use crate::merge::pages::PageAssembly;
use crate::model::{MergeReport, OrderItem};
use crate::print::{Printer, platform_printer};

/// Extracts, merges and prints barcode PDFs.
#[derive(Clone)]
pub struct Assembler {
    printer: Arc<dyn Printer>,
    writer: PdfWriter,
    span: Span,
}

impl Assembler {
    /// Create an assembler that prints through `printer`.
    pub fn new<P: Printer + 'static>(printer: P) -> Self {
        Self::with_printer(Arc::new(printer))
    }

    /// Create an assembler sharing an existing printer.
    pub fn with_printer(printer: Arc<dyn Printer>) -> Self {
        Self {
            printer,
            writer: PdfWriter::new(),
            span: info_span!("assembler"),
        }
    }

    /// Create an assembler using the running platform's print command.
    pub fn for_platform() -> Self {
        Self::with_printer(platform_printer())
    }

    /// Unpack `zip_path` into a scoped temporary directory.
    ///
    /// The caller owns the returned handle; the directory lives until it is
    /// released or dropped.
    pub fn extract(&self, zip_path: &Path) -> Result<ExtractedArchive, AssemblyError> {
        let _entered = self.span.enter();
        info!(archive = %zip_path.display(), "extracting barcode archive");

        archive::extract(zip_path).inspect_err(|err| error!(%err, "extraction failed"))
    }

    /// Find the barcode file for `sku` in `dir`.
    pub fn locate(&self, sku: u64, dir: &Path) -> Option<PathBuf> {
        locate(sku, dir)
    }

    /// Merge barcode pages for `items` from `dir` into `output_path`.
    ///
    /// Each item contributes the first page of its barcode file `quantity`
    /// times. Items without a file are listed in the report's `missing_pdfs`;
    /// items whose file cannot be parsed or has no pages are only counted as
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NoPagesToSave`] when no page was produced, in
    /// which case no file is written, and [`AssemblyError::FailedToWrite`]
    /// when the output cannot be saved.
    pub fn merge(
        &self,
        items: &[OrderItem],
        dir: &Path,
        output_path: &Path,
    ) -> Result<MergeReport, AssemblyError> {
        let _entered = self.span.enter();
        info!(
            items = items.len(),
            dir = %dir.display(),
            output = %output_path.display(),
            "merging barcode pages"
        );

        let mut report = MergeReport::new(items.len());
        let mut assembly = PageAssembly::new();

        for item in items {
            let Some(path) = self.locate(item.sku, dir) else {
                warn!(
                    sku = item.sku,
                    name = item.display_name(),
                    quantity = item.quantity,
                    "no barcode PDF for item"
                );
                report.record_missing(item);
                continue;
            };

            let loaded = match PdfReader::load(&path) {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!(sku = item.sku, %err, "skipping unusable barcode PDF");
                    report.record_unusable();
                    continue;
                }
            };

            if loaded.page_count > 1 {
                debug!(
                    sku = item.sku,
                    pages = loaded.page_count,
                    "barcode PDF has several pages, using the first"
                );
            }

            if let Err(err) = assembly.append_first_page(loaded.document, item.quantity) {
                warn!(sku = item.sku, file = %path.display(), %err, "skipping barcode PDF");
                report.record_unusable();
                continue;
            }

            debug!(
                sku = item.sku,
                file = %path.display(),
                copies = item.quantity,
                "barcode page added"
            );
            report.record_processed(item.quantity);
        }

        if report.total_pages == 0 {
            error!(
                skipped = report.skipped_items,
                missing = report.missing_pdfs.len(),
                "no pages to save"
            );
            return Err(AssemblyError::NoPagesToSave);
        }

        let mut document = assembly.finish()?;
        let stats = self.writer.save(&mut document, output_path)?;

        info!(
            processed = report.processed_items,
            total = report.total_items,
            skipped = report.skipped_items,
            pages = report.total_pages,
            bytes = stats.file_size,
            output = %stats.output_path.display(),
            "merged PDF written"
        );

        Ok(report)
    }

    /// Send `path` to `printer`, or the system default.
    ///
    /// Failures are logged and reported as `false`.
    pub fn print(&self, path: &Path, printer: Option<&str>) -> bool {
        let _entered = self.span.enter();
        info!(file = %path.display(), printer = printer.unwrap_or("default"), "printing");

        let printed = self.printer.print(path, printer);
        if !printed {
            warn!(file = %path.display(), "printing failed; the PDF is still available");
        }
        printed
    }
}
