//! Order and report records shared by the resolver and the assembler.

use serde::{Deserialize, Serialize};

/// One stock-keeping unit within a resolved order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Marketplace SKU, the join key against barcode file names.
    pub sku: u64,

    /// Seller-defined article.
    #[serde(default)]
    pub offer_id: Option<String>,

    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,

    /// Number of physical labels to print.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl OrderItem {
    /// Create an item with no offer id.
    pub fn new(sku: u64, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku,
            offer_id: None,
            name: name.into(),
            quantity,
        }
    }

    /// Name for display, substituting a placeholder for empty names.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown item"
        } else {
            &self.name
        }
    }
}

/// Result of resolving an order number or supply id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    /// The original query key.
    pub order_number: String,

    /// Order-request identifiers matched to the order number.
    pub order_ids: Vec<i64>,

    /// Flat item list, in remote order, duplicates kept.
    pub items: Vec<OrderItem>,

    /// Number of item lines.
    pub total_unique: usize,

    /// Sum of all quantities.
    pub total_quantity: u64,
}

impl ResolvedOrder {
    /// Build a resolved order and compute its totals.
    pub fn new(order_number: impl Into<String>, order_ids: Vec<i64>, items: Vec<OrderItem>) -> Self {
        let total_unique = items.len();
        let total_quantity = items.iter().map(|item| u64::from(item.quantity)).sum();

        Self {
            order_number: order_number.into(),
            order_ids,
            items,
            total_unique,
            total_quantity,
        }
    }
}

/// An item that could not be matched to a barcode file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPdf {
    /// SKU of the item.
    pub sku: u64,
    /// Name of the item, as resolved.
    pub name: String,
    /// Labels that were not produced.
    pub quantity: u32,
}

impl From<&OrderItem> for MissingPdf {
    fn from(item: &OrderItem) -> Self {
        Self {
            sku: item.sku,
            name: item.name.clone(),
            quantity: item.quantity,
        }
    }
}

/// Outcome of a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Items handed to the merge.
    pub total_items: usize,

    /// Items whose barcode page was written (including zero-quantity items).
    pub processed_items: usize,

    /// Items that produced no pages because of a missing or unusable file.
    pub skipped_items: usize,

    /// Pages written to the output document.
    pub total_pages: u64,

    /// Items without a barcode file, in input order.
    pub missing_pdfs: Vec<MissingPdf>,
}

impl MergeReport {
    /// Start a report for `total_items` items.
    pub fn new(total_items: usize) -> Self {
        Self {
            total_items,
            ..Default::default()
        }
    }

    /// Record an item whose page was replicated `pages` times.
    pub fn record_processed(&mut self, pages: u32) {
        self.processed_items += 1;
        self.total_pages += u64::from(pages);
    }

    /// Record an item with no barcode file.
    pub fn record_missing(&mut self, item: &OrderItem) {
        self.skipped_items += 1;
        self.missing_pdfs.push(MissingPdf::from(item));
    }

    /// Record an item whose file exists but could not be used.
    pub fn record_unusable(&mut self) {
        self.skipped_items += 1;
    }
}
