//! CLI argument parsing for ozon-labels.
//!
//! Every credential and directory can come from a flag or from the
//! environment; flags win.
//!
//! # Examples
//!
//! ```text
//! ozon-labels --order-number 2000038642317 --zip-path labels.zip --print
//! ozon-labels --supply-id 987654 --zip-path labels.zip
//! ozon-labels --validate
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ozon_labels::config::{Config, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use ozon_labels::error::ConfigError;
use ozon_labels::pipeline::{PipelineRequest, Target};

/// Build print-ready barcode label sheets for Ozon FBO supplies.
///
/// Looks up the items of an order, picks the matching barcode PDF for each
/// item from a ZIP archive, repeats every label as many times as ordered and
/// writes one merged PDF, optionally sending it to a printer.
#[derive(Parser, Debug)]
#[command(name = "ozon-labels")]
#[command(version)]
#[command(about = "Assemble barcode label sheets for Ozon FBO supplies", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Order number to resolve through the Seller API
    #[arg(short, long, value_name = "NUMBER", conflicts_with = "supply_id")]
    pub order_number: Option<String>,

    /// Supply id to resolve directly, skipping the order search
    #[arg(long, value_name = "ID")]
    pub supply_id: Option<i64>,

    /// ZIP archive with one barcode PDF per SKU
    #[arg(short, long, value_name = "FILE")]
    pub zip_path: Option<PathBuf>,

    /// Send the merged PDF to a printer
    #[arg(short, long)]
    pub print: bool,

    /// Printer name (defaults to DEFAULT_PRINTER, then the system default)
    #[arg(long, value_name = "NAME")]
    pub printer: Option<String>,

    /// Check configuration and API credentials, then exit
    #[arg(long, conflicts_with_all = ["order_number", "supply_id", "zip_path", "print"])]
    pub validate: bool,

    /// Seller API client id
    #[arg(long, env = "OZON_CLIENT_ID", hide_env_values = true, value_name = "ID")]
    pub client_id: Option<String>,

    /// Seller API key
    #[arg(long, env = "OZON_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Seller API base URL
    #[arg(long, env = "OZON_API_URL", default_value = DEFAULT_API_URL, value_name = "URL")]
    pub api_url: String,

    /// Directory for merged PDFs
    #[arg(long, env = "OUTPUT_DIR", default_value = "./output", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Directory for daily log files
    #[arg(long, env = "LOGS_DIR", default_value = "./logs", value_name = "DIR")]
    pub logs_dir: PathBuf,

    /// Printer used when --printer is not given
    #[arg(long, env = "DEFAULT_PRINTER", hide = true)]
    pub default_printer: Option<String>,

    /// Timeout for a single API request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - debug logging and extra detail
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the binary was asked to do.
#[derive(Debug)]
pub enum Mode {
    /// Check configuration and credentials.
    Validate,
    /// Run the label pipeline.
    Run(PipelineRequest),
}

impl Cli {
    /// Collect the runtime configuration. Validation happens separately so
    /// every problem can be reported at once.
    pub fn to_config(&self) -> Config {
        Config {
            client_id: self.client_id.clone().unwrap_or_default(),
            api_key: self.api_key.clone().unwrap_or_default(),
            api_url: self.api_url.clone(),
            output_dir: self.output_dir.clone(),
            logs_dir: self.logs_dir.clone(),
            default_printer: self.default_printer.clone(),
            request_timeout: Duration::from_secs(self.timeout),
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }

    /// Decide the mode from the given flags.
    ///
    /// # Errors
    ///
    /// A run needs a target (order number or supply id) and an archive.
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        if self.validate {
            return Ok(Mode::Validate);
        }

        let target = match (&self.order_number, self.supply_id) {
            (Some(number), _) if !number.trim().is_empty() => {
                Target::OrderNumber(number.trim().to_string())
            }
            (_, Some(id)) => Target::SupplyId(id),
            _ => {
                return Err(ConfigError::Missing {
                    name: "--order-number or --supply-id",
                });
            }
        };

        let zip_path = self
            .zip_path
            .clone()
            .ok_or(ConfigError::Missing { name: "--zip-path" })?;

        Ok(Mode::Run(PipelineRequest {
            target,
            zip_path,
            print: self.print,
            printer: self.printer.clone(),
        }))
    }
}
