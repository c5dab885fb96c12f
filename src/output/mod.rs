//! Console output for humans.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};
