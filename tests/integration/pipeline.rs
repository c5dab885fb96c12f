//! Full runs: scripted API, generated archive, recording printer.

use serde_json::json;
use serial_test::serial;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ozon_labels::api::SEARCH_ENDPOINT;
use ozon_labels::config::Config;
use ozon_labels::error::{AssemblyError, Error, ResolutionError};
use ozon_labels::merge::Assembler;
use ozon_labels::model::MissingPdf;
use ozon_labels::pipeline::{Pipeline, PipelineRequest, Target};
use ozon_labels::resolver::OrderResolver;

use crate::common::{
    ORDER_NUMBER, RecordingPrinter, ScriptedTransport, barcode_pdf, extraction_dirs, order_script,
    page_widths, write_zip,
};

struct Fixture {
    scratch: TempDir,
    printer: RecordingPrinter,
    pipeline: Pipeline,
}

impl Fixture {
    fn new(transport: ScriptedTransport, printer: RecordingPrinter) -> Self {
        let scratch = TempDir::new().unwrap();
        let config = Config {
            client_id: "1".into(),
            api_key: "key".into(),
            output_dir: scratch.path().join("output"),
            default_printer: Some("Zebra".into()),
            ..Default::default()
        };
        let pipeline = Pipeline::new(
            OrderResolver::new(transport),
            Assembler::new(printer.clone()),
            &config,
        );

        Self {
            scratch,
            printer,
            pipeline,
        }
    }

    fn zip(&self, files: &[(&str, Vec<u8>)]) -> PathBuf {
        let path = self.scratch.path().join("labels.zip");
        write_zip(&path, files);
        path
    }

    fn request(&self, zip_path: PathBuf, print: bool) -> PipelineRequest {
        PipelineRequest {
            target: Target::OrderNumber(ORDER_NUMBER.to_string()),
            zip_path,
            print,
            printer: None,
        }
    }

    fn output_path(&self) -> PathBuf {
        self.scratch
            .path()
            .join("output")
            .join(format!("supply_{ORDER_NUMBER}_full.pdf"))
    }
}

/// Points the process temp directory at a private folder for one test.
struct TempDirOverride {
    dir: TempDir,
    previous: Option<std::ffi::OsString>,
}

impl TempDirOverride {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let previous = std::env::var_os("TMPDIR");
        unsafe {
            std::env::set_var("TMPDIR", dir.path());
        }
        Self { dir, previous }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for TempDirOverride {
    fn drop(&mut self) {
        unsafe {
            match &self.previous {
                Some(previous) => std::env::set_var("TMPDIR", previous),
                None => std::env::remove_var("TMPDIR"),
            }
        }
    }
}

#[tokio::test]
#[serial]
async fn test_full_run() {
    let fixture = Fixture::new(order_script(), RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("111.pdf", barcode_pdf(1)), ("222.pdf", barcode_pdf(1))]);

    let outcome = fixture
        .pipeline
        .run(&fixture.request(zip, false))
        .await
        .unwrap();

    assert_eq!(outcome.order.total_quantity, 3);
    assert_eq!(outcome.report.processed_items, 2);
    assert_eq!(outcome.report.skipped_items, 0);
    assert_eq!(outcome.report.total_pages, 3);
    assert!(outcome.report.missing_pdfs.is_empty());
    assert_eq!(outcome.output_path, fixture.output_path());
    assert!(outcome.file_size > 0);
    assert_eq!(outcome.printed, None);
    assert_eq!(page_widths(&outcome.output_path).len(), 3);
    assert!(fixture.printer.jobs().is_empty());
}

#[tokio::test]
#[serial]
async fn test_missing_barcode_and_printing() {
    let fixture = Fixture::new(order_script(), RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("111.pdf", barcode_pdf(1))]);

    let outcome = fixture
        .pipeline
        .run(&fixture.request(zip, true))
        .await
        .unwrap();

    assert_eq!(outcome.report.total_pages, 2);
    assert_eq!(outcome.report.skipped_items, 1);
    assert_eq!(
        outcome.report.missing_pdfs,
        vec![MissingPdf {
            sku: 222,
            name: "Plate".to_string(),
            quantity: 1
        }]
    );
    assert_eq!(outcome.printed, Some(true));

    let jobs = fixture.printer.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].0, fixture.output_path());
    assert_eq!(jobs[0].1.as_deref(), Some("Zebra"));
}

#[tokio::test]
#[serial]
async fn test_print_failure_keeps_the_file() {
    let fixture = Fixture::new(order_script(), RecordingPrinter::failing());
    let zip = fixture.zip(&[("111.pdf", barcode_pdf(1)), ("222.pdf", barcode_pdf(1))]);

    let mut request = fixture.request(zip, true);
    request.printer = Some("Office".to_string());
    let outcome = fixture.pipeline.run(&request).await.unwrap();

    assert_eq!(outcome.printed, Some(false));
    assert!(outcome.output_path.exists());
    assert_eq!(fixture.printer.jobs()[0].1.as_deref(), Some("Office"));
}

#[tokio::test]
#[serial]
async fn test_no_pages_fails_without_output() {
    let fixture = Fixture::new(order_script(), RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("999.pdf", barcode_pdf(1))]);

    let err = fixture
        .pipeline
        .run(&fixture.request(zip, true))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Assembly(AssemblyError::NoPagesToSave)
    ));
    assert!(!fixture.output_path().exists());
    assert!(fixture.printer.jobs().is_empty());
}

#[tokio::test]
#[serial]
async fn test_resolution_failure_stops_the_run() {
    let transport = ScriptedTransport::new().ok(SEARCH_ENDPOINT, json!({"order_ids": []}));
    let fixture = Fixture::new(transport, RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("111.pdf", barcode_pdf(1))]);

    let err = fixture
        .pipeline
        .run(&fixture.request(zip, true))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::NoMatchingOrders { .. })
    ));
    assert!(!fixture.output_path().exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_archive_is_removed_on_success_and_failure() {
    let temp = TempDirOverride::new();

    let fixture = Fixture::new(order_script(), RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("111.pdf", barcode_pdf(1))]);
    fixture
        .pipeline
        .run(&fixture.request(zip, false))
        .await
        .unwrap();
    assert!(extraction_dirs(temp.path()).is_empty());

    let fixture = Fixture::new(order_script(), RecordingPrinter::succeeding());
    let zip = fixture.zip(&[("999.pdf", barcode_pdf(1))]);
    let result = fixture.pipeline.run(&fixture.request(zip, false)).await;
    assert!(result.is_err());
    assert!(extraction_dirs(temp.path()).is_empty());
}
