//! Console output for a run.
//!
//! Status lines, the resolved order table and the merge results. Quiet mode
//! keeps warnings and errors only; verbose mode adds debug lines and details.
//! Warnings and errors go to stderr, everything else to stdout.
//!
//! # Examples
//!
//! ```
//! use ozon_labels::output::formatter::OutputFormatter;
//!
//! let console = OutputFormatter::new(false, false);
//! console.info("Resolving order 2000038642317...");
//! console.success("Labels ready");
//! console.error("Archive not found");
//! ```

use std::io::{self, IsTerminal};
use std::path::Path;

use crate::config::Config;
use crate::model::{MergeReport, ResolvedOrder};
use crate::utils::{format_file_size, truncate_text};

/// Longest item name shown in tables.
pub const NAME_WIDTH: usize = 50;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";
const RESET: &str = "\x1b[0m";

/// Kind of a console status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
    /// Only shown in verbose mode.
    Debug,
}

impl MessageLevel {
    fn marker(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn ansi(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Error => Some("\x1b[31m"),
            Self::Debug => Some("\x1b[36m"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Prints run progress and summaries to the console.
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// `quiet` hides everything below warnings; `verbose` adds debug lines.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(MessageLevel::Debug, message);
    }

    fn shows(&self, level: MessageLevel) -> bool {
        match level {
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Debug => self.verbose,
            MessageLevel::Info | MessageLevel::Success => !self.quiet,
        }
    }

    fn emit(&self, level: MessageLevel, message: &str) {
        if !self.shows(level) {
            return;
        }

        let line = match level.ansi() {
            Some(code) if self.colored => format!("{code}{}{message}{RESET}", level.marker()),
            _ => format!("{}{message}", level.marker()),
        };

        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// `label: value` line, verbose mode only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print the resolved order. Suppressed in quiet mode.
    pub fn display_order_summary(&self, order: &ResolvedOrder) {
        if !self.quiet {
            for line in order_summary_lines(order) {
                println!("{line}");
            }
        }
    }

    /// Print the merge results.
    ///
    /// In quiet mode only the skipped-items warning is shown.
    pub fn display_merge_report(&self, report: &MergeReport, output_path: &Path, file_size: u64) {
        if self.quiet {
            if report.skipped_items > 0 {
                self.warning(&format!("Skipped items: {}", report.skipped_items));
            }
            return;
        }

        for line in merge_report_lines(report, output_path, file_size) {
            println!("{line}");
        }
    }

    /// Print configuration problems as a bulleted list. Always shown.
    pub fn display_config_errors<E: std::fmt::Display>(&self, errors: &[E]) {
        self.error("Configuration errors:");
        for error in errors {
            eprintln!("  - {error}");
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// Lines of the order summary table.
pub fn order_summary_lines(order: &ResolvedOrder) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        format!("ORDER {}", order.order_number),
        RULE.to_string(),
    ];

    if !order.order_ids.is_empty() {
        let ids: Vec<String> = order.order_ids.iter().map(i64::to_string).collect();
        lines.push(format!("Order-request ids: {}", ids.join(", ")));
    }
    lines.push(format!("Unique items: {}", order.total_unique));
    lines.push(format!("Labels to print: {}", order.total_quantity));
    lines.push(String::new());
    lines.push("Items:".to_string());
    lines.push(THIN_RULE.to_string());

    for (idx, item) in order.items.iter().enumerate() {
        let name = truncate_text(item.display_name(), NAME_WIDTH);
        lines.push(format!(
            "{:2}. SKU {:<10} - {:<width$} ({} pcs)",
            idx + 1,
            item.sku,
            name,
            item.quantity,
            width = NAME_WIDTH
        ));
    }

    lines.push(RULE.to_string());
    lines
}

/// Lines of the merge results block.
pub fn merge_report_lines(report: &MergeReport, output_path: &Path, file_size: u64) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        "RESULTS".to_string(),
        RULE.to_string(),
        format!(
            "Processed items: {}/{}",
            report.processed_items, report.total_items
        ),
        format!("Pages written: {}", report.total_pages),
    ];

    if report.skipped_items > 0 {
        lines.push(String::new());
        lines.push(format!("⚠ Skipped items: {}", report.skipped_items));

        if !report.missing_pdfs.is_empty() {
            lines.push(String::new());
            lines.push("Items without a PDF file:".to_string());
            for missing in &report.missing_pdfs {
                let name = if missing.name.trim().is_empty() {
                    "Unknown item"
                } else {
                    missing.name.as_str()
                };
                lines.push(format!(
                    "  - SKU {}: {} ({} pcs)",
                    missing.sku,
                    truncate_text(name, NAME_WIDTH),
                    missing.quantity
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("✓ Created file: {}", output_path.display()));
    lines.push(format!("  Size: {}", format_file_size(file_size)));
    lines.push(RULE.to_string());
    lines
}
