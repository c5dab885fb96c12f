//! # ozon-labels
//!
//! Builds print-ready barcode label sheets for marketplace supplies.
//!
//! A run has two halves:
//!
//! - [`resolver::OrderResolver`] turns an order number into a flat item list
//!   through the Seller API (search, expand, bundle contents).
//! - [`merge::Assembler`] unpacks a ZIP of per-SKU barcode PDFs, repeats each
//!   item's first barcode page `quantity` times into one document and can
//!   send the result to a printer.
//!
//! [`pipeline::Pipeline`] wires the two together and guarantees the extracted
//! archive is removed however the run ends.
//!
//! ## Example
//!
//! ```no_run
//! use ozon_labels::config::Config;
//! use ozon_labels::pipeline::{Pipeline, PipelineRequest, Target};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     client_id: "12345".into(),
//!     api_key: "api-key".into(),
//!     ..Default::default()
//! };
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let outcome = pipeline
//!     .run(&PipelineRequest {
//!         target: Target::OrderNumber("2000038642317".into()),
//!         zip_path: "labels.zip".into(),
//!         print: false,
//!         printer: None,
//!     })
//!     .await?;
//! println!("{} pages written", outcome.report.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod print;
pub mod resolver;
pub mod utils;

pub use error::{AssemblyError, ConfigError, Error, ResolutionError, Result, Stage, TransportError};
pub use merge::Assembler;
pub use model::{MergeReport, MissingPdf, OrderItem, ResolvedOrder};
pub use resolver::OrderResolver;
