//! Barcode page merging.

pub mod assembler;
pub mod locate;
pub mod pages;

pub use assembler::Assembler;
pub use locate::locate;
pub use pages::PageAssembly;
