use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Whether `path` has a `.pdf` extension, ignoring ASCII case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// PDF files directly inside `dir`, sorted by file name.
///
/// Nested directories are not descended into. Unreadable entries are skipped.
pub fn collect_pdf_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_pdf_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Copy every object reachable from `obj` out of `source` into `target`,
/// without following references into `excluded`.
///
/// Object ids are kept, so `source` must already be renumbered past the ids
/// used by `target`.
pub fn copy_references(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    excluded: &BTreeSet<ObjectId>,
) {
    match obj {
        Object::Reference(ref_id) => {
            if !excluded.contains(ref_id)
                && !target.objects.contains_key(ref_id)
                && let Ok(referenced_obj) = source.get_object(*ref_id)
            {
                target.objects.insert(*ref_id, referenced_obj.clone());
                copy_references(target, source, referenced_obj, excluded);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                copy_references(target, source, value, excluded);
            }
        }
        Object::Array(arr) => {
            for item in arr {
                copy_references(target, source, item, excluded);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                copy_references(target, source, value, excluded);
            }
        }
        _ => {}
    }
}

/// Truncate `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Format a byte count as kilobytes with one decimal.
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}
