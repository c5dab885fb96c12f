//! Error types for ozon-labels.
//!
//! Errors are split along the two halves of the pipeline so callers can tell
//! which stage of a run gave up.
//!
//! # Error Categories
//!
//! - **Resolution Errors**: anything in the search, expand or bundle protocol
//! - **Assembly Errors**: archive problems and empty output
//! - **Configuration Errors**: missing or malformed credentials and settings
//! - **Transport Errors**: HTTP-level failures, wrapped by resolution errors

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for ozon-labels operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote protocol stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Order-request lookup by order number.
    Search,
    /// Batched order-request detail fetch.
    Expand,
    /// Bundle contents of one sub-supply.
    Bundle,
    /// Bundle contents addressed directly by supply id.
    Supply,
    /// Credential check.
    Credentials,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Search => "search",
            Self::Expand => "expand",
            Self::Bundle => "bundle",
            Self::Supply => "supply",
            Self::Credentials => "credentials",
        };
        f.write_str(name)
    }
}

/// Failure of a single HTTP call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server rejected the credentials.
    #[error("unauthorized (HTTP {status}): {body}")]
    Unauthorized {
        /// HTTP status code (401 or 403).
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The body was not valid JSON.
    #[error("failed to decode JSON response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether the server refused the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Failure anywhere in the order resolution protocol.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// A remote call failed.
    #[error("{stage} call to {endpoint} failed: {source}")]
    Transport {
        /// Stage the call belonged to.
        stage: Stage,
        /// Endpoint path.
        endpoint: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The response matched none of the known shapes.
    #[error("{stage} response has no '{field}' field (top-level keys: [{}])", .keys.join(", "))]
    UnexpectedShape {
        /// Stage the response belonged to.
        stage: Stage,
        /// Field that was looked for.
        field: &'static str,
        /// Top-level keys that were present.
        keys: Vec<String>,
    },

    /// A record inside the response could not be decoded.
    #[error("{stage} response contains an invalid '{field}' record: {reason}")]
    InvalidRecord {
        /// Stage the response belonged to.
        stage: Stage,
        /// Field holding the record.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// The search found no order-requests.
    #[error("no matching order-requests for order number {order_number}")]
    NoMatchingOrders {
        /// Queried order number.
        order_number: String,
    },

    /// The expand call returned no order details.
    #[error("no order details returned for order-requests {order_ids:?}")]
    NoOrderDetails {
        /// Identifiers that were expanded.
        order_ids: Vec<i64>,
    },

    /// All stages succeeded but not a single item was collected.
    #[error("order {reference} contains no items")]
    NoItems {
        /// Order number or supply id.
        reference: String,
    },
}

impl ResolutionError {
    /// Stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Transport { stage, .. }
            | Self::UnexpectedShape { stage, .. }
            | Self::InvalidRecord { stage, .. } => Some(*stage),
            Self::NoMatchingOrders { .. } => Some(Stage::Search),
            Self::NoOrderDetails { .. } => Some(Stage::Expand),
            Self::NoItems { .. } => None,
        }
    }
}

/// Failure while extracting the archive or assembling the output PDF.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// The archive path does not exist.
    #[error("archive not found: {}", .path.display())]
    ArchiveNotFound {
        /// Path that was given.
        path: PathBuf,
    },

    /// The file exists but is not a ZIP container.
    #[error("not a ZIP archive: {}\n  Reason: {reason}", .path.display())]
    NotAnArchive {
        /// Path that was given.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The container was recognised but an entry could not be unpacked.
    #[error("corrupt ZIP archive: {}\n  Reason: {reason}", .path.display())]
    CorruptArchive {
        /// Path that was given.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The scratch directory could not be created.
    #[error("failed to create temporary directory: {source}")]
    TempDir {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Every item was missing or unusable.
    #[error("no pages to save; check that the archive contains the barcode PDFs")]
    NoPagesToSave,

    /// Page-tree manipulation failed.
    #[error("failed to assemble pages: {reason}")]
    PageTree {
        /// Description of the failure.
        reason: String,
    },

    /// The output file could not be written.
    #[error("failed to write output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The blocking assembly task was cancelled or panicked.
    #[error("assembly task failed: {0}")]
    Task(String),
}

impl AssemblyError {
    /// Create a PageTree error.
    pub fn page_tree(reason: impl Into<String>) -> Self {
        Self::PageTree {
            reason: reason.into(),
        }
    }
}

/// Invalid runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("{name} is not set")]
    Missing {
        /// Setting name, as the user configures it.
        name: &'static str,
    },

    /// A setting is present but unusable.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Order resolution failed.
    #[error("API error: {0}")]
    Resolution(#[from] ResolutionError),

    /// PDF assembly failed.
    #[error("PDF processing error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
