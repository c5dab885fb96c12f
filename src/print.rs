//! Sending the assembled PDF to a printer.
//!
//! Printing is a fire-and-report side effect: implementations return whether
//! the job was handed to the OS spooler and log why when it was not. Nothing
//! here returns an error.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{info, warn};

/// Submits a file to a named or default printer.
pub trait Printer: Send + Sync {
    /// Submit `path` to `printer`, or to the system default when `None`.
    fn print(&self, path: &Path, printer: Option<&str>) -> bool;
}

/// CUPS `lp`, used on Linux.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpPrinter;

/// BSD `lpr`, used on macOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct LprPrinter;

/// Shell print verbs through PowerShell, used on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsShellPrinter;

/// Fallback for platforms without a known print command.
#[derive(Debug, Clone)]
pub struct UnsupportedPrinter {
    os: String,
}

impl UnsupportedPrinter {
    pub fn new(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }
}

/// Printer implementation for the running platform.
pub fn platform_printer() -> Arc<dyn Printer> {
    printer_for_os(std::env::consts::OS)
}

/// Printer implementation for an `std::env::consts::OS` value.
pub fn printer_for_os(os: &str) -> Arc<dyn Printer> {
    match os {
        "linux" => Arc::new(LpPrinter),
        "macos" => Arc::new(LprPrinter),
        "windows" => Arc::new(WindowsShellPrinter),
        other => Arc::new(UnsupportedPrinter::new(other)),
    }
}

impl LpPrinter {
    fn command(path: &Path, printer: Option<&str>) -> Command {
        let mut command = Command::new("lp");
        if let Some(printer) = printer {
            command.arg("-d").arg(printer);
        }
        command.arg(path);
        command
    }
}

impl LprPrinter {
    fn command(path: &Path, printer: Option<&str>) -> Command {
        let mut command = Command::new("lpr");
        if let Some(printer) = printer {
            command.arg("-P").arg(printer);
        }
        command.arg(path);
        command
    }
}

impl WindowsShellPrinter {
    fn command(path: &Path, printer: Option<&str>) -> Command {
        let file = powershell_quote(&path.to_string_lossy());
        let script = match printer {
            Some(printer) => format!(
                "Start-Process -FilePath {file} -Verb PrintTo -ArgumentList {}",
                powershell_quote(&format!("\"{printer}\""))
            ),
            None => format!("Start-Process -FilePath {file} -Verb Print"),
        };

        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
        command
    }
}

fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Printer for LpPrinter {
    fn print(&self, path: &Path, printer: Option<&str>) -> bool {
        submit(Self::command(path, printer), path, printer)
    }
}

impl Printer for LprPrinter {
    fn print(&self, path: &Path, printer: Option<&str>) -> bool {
        submit(Self::command(path, printer), path, printer)
    }
}

impl Printer for WindowsShellPrinter {
    fn print(&self, path: &Path, printer: Option<&str>) -> bool {
        submit(Self::command(path, printer), path, printer)
    }
}

impl Printer for UnsupportedPrinter {
    fn print(&self, path: &Path, _printer: Option<&str>) -> bool {
        warn!(os = %self.os, file = %path.display(), "printing is not supported on this platform");
        false
    }
}

fn submit(mut command: Command, path: &Path, printer: Option<&str>) -> bool {
    let printer_name = printer.unwrap_or("default");

    if !path.is_file() {
        warn!(file = %path.display(), "nothing to print: file does not exist");
        return false;
    }

    match command.output() {
        Ok(output) if output.status.success() => {
            info!(file = %path.display(), printer = printer_name, "sent to printer");
            true
        }
        Ok(output) => {
            warn!(
                file = %path.display(),
                printer = printer_name,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "print command failed"
            );
            false
        }
        Err(err) => {
            warn!(
                program = ?command.get_program(),
                printer = printer_name,
                %err,
                "print command could not be started"
            );
            false
        }
    }
}
