//! Mapping a SKU onto a barcode file.

use std::path::{Path, PathBuf};

use crate::utils::collect_pdf_files;

/// Find the barcode PDF for `sku` in `dir`.
///
/// Rules, first match wins:
///
/// 1. `{sku}.pdf`
/// 2. `OZN{sku}.pdf`
/// 3. `{sku}_barcode.pdf`
/// 4. the first PDF, by file name, whose stem contains the SKU digits
///
/// Only top-level entries are considered. `None` is not an error; the merge
/// decides what a missing file means.
pub fn locate(sku: u64, dir: &Path) -> Option<PathBuf> {
    let sku = sku.to_string();
    let files = collect_pdf_files(dir);

    let exact = [
        format!("{sku}.pdf"),
        format!("OZN{sku}.pdf"),
        format!("{sku}_barcode.pdf"),
    ];

    exact
        .iter()
        .find_map(|name| {
            files
                .iter()
                .find(|path| path.file_name().is_some_and(|file| file == name.as_str()))
        })
        .or_else(|| {
            files.iter().find(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.contains(&sku))
            })
        })
        .cloned()
}
