//! Shared helpers for the integration tests.
//!
//! Barcode PDFs and ZIP archives are generated on the fly; the Seller API is
//! replaced by [`ScriptedTransport`] and the printer by [`RecordingPrinter`].

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;

use ozon_labels::api::{BUNDLE_ENDPOINT, EXPAND_ENDPOINT, SEARCH_ENDPOINT, Transport};
use ozon_labels::error::TransportError;
use ozon_labels::print::Printer;

pub const ORDER_NUMBER: &str = "2000038642317";

/// Width of page `n` in generated barcode PDFs; lets tests tell pages apart.
pub fn page_width(n: usize) -> i64 {
    100 + n as i64
}

/// Serialize a PDF with `pages` pages.
pub fn barcode_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 0..pages {
        let content = format!("0 0 {} 40 re f", page_width(n));
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width(n).into(), 80.into()],
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write `files` into `dir`.
pub fn write_files(dir: &Path, files: &[(&str, Vec<u8>)]) {
    for (name, bytes) in files {
        std::fs::write(dir.join(name), bytes).unwrap();
    }
}

/// Write a ZIP archive holding `files`.
pub fn write_zip(path: &Path, files: &[(&str, Vec<u8>)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// MediaBox widths of every page of the PDF at `path`, in page order.
pub fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_dictionary(*page_id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// Names of `ozon_barcodes_*` directories directly inside `dir`.
pub fn extraction_dirs(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("ozon_barcodes_"))
        })
        .collect()
}

#[derive(Default)]
struct Script {
    replies: VecDeque<(String, Result<Value, TransportError>)>,
    requests: Vec<(String, Value)>,
}

/// In-memory transport that replays canned responses in order.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, endpoint: &str, body: Value) -> Self {
        self.push(endpoint, Ok(body))
    }

    pub fn fail(self, endpoint: &str, err: TransportError) -> Self {
        self.push(endpoint, Err(err))
    }

    fn push(self, endpoint: &str, reply: Result<Value, TransportError>) -> Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back((endpoint.to_string(), reply));
        self
    }

    /// Requests seen so far, as (endpoint, body).
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.script.lock().unwrap().requests.clone()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push((endpoint.to_string(), body.clone()));

        match script.replies.pop_front() {
            Some((expected, reply)) if expected == endpoint => reply,
            Some((expected, _)) => Err(TransportError::Network(format!(
                "expected a call to {expected}, got {endpoint}"
            ))),
            None => Err(TransportError::Network(format!(
                "unexpected call to {endpoint}"
            ))),
        }
    }
}

/// Order 2000038642317: one order-request, one sub-supply, SKU 111 x2 and
/// SKU 222 x1.
pub fn order_script() -> ScriptedTransport {
    ScriptedTransport::new()
        .ok(SEARCH_ENDPOINT, json!({"order_ids": [5001]}))
        .ok(
            EXPAND_ENDPOINT,
            json!({"orders": [{
                "supply_order_id": 5001,
                "drop_off_warehouse": {"warehouse_id": 10},
                "supplies": [
                    {"bundle_id": "bundle-1", "storage_warehouse_id": 20, "supply_id": 7001}
                ]
            }]}),
        )
        .ok(
            BUNDLE_ENDPOINT,
            json!({
                "items": [
                    {"sku": 111, "offer_id": "CUP-1", "name": "Cup", "quantity": 2},
                    {"sku": 222, "offer_id": "PLT-1", "name": "Plate", "quantity": 1}
                ],
                "has_next": false,
                "last_id": ""
            }),
        )
}

/// Printer stub that records jobs and answers with a fixed result.
#[derive(Clone)]
pub struct RecordingPrinter {
    succeed: bool,
    jobs: Arc<Mutex<Vec<(PathBuf, Option<String>)>>>,
}

impl RecordingPrinter {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            jobs: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            jobs: Arc::default(),
        }
    }

    pub fn jobs(&self) -> Vec<(PathBuf, Option<String>)> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Printer for RecordingPrinter {
    fn print(&self, path: &Path, printer: Option<&str>) -> bool {
        self.jobs
            .lock()
            .unwrap()
            .push((path.to_path_buf(), printer.map(str::to_string)));
        self.succeed
    }
}
