//! Request bodies and response records for the supply-order endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-request state the search is restricted to.
pub const READY_TO_SUPPLY: &str = "READY_TO_SUPPLY";

/// Page size used for list and bundle calls.
pub const PAGE_LIMIT: u32 = 100;

/// Body of the order-request search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Search filter.
    pub filter: SearchFilter,
    /// Pagination.
    pub paging: Paging,
}

/// Filter part of [`SearchRequest`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchFilter {
    /// Human-facing order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number_search: Option<String>,
    /// Accepted order-request states.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
}

/// Cursor pagination for the search call.
#[derive(Debug, Clone, Serialize)]
pub struct Paging {
    /// Identifier to continue after.
    pub from_supply_order_id: i64,
    /// Maximum identifiers to return.
    pub limit: u32,
}

impl SearchRequest {
    /// Search for ready-to-supply order-requests with the given number.
    pub fn by_order_number(order_number: &str) -> Self {
        Self {
            filter: SearchFilter {
                order_number_search: Some(order_number.to_string()),
                states: vec![READY_TO_SUPPLY.to_string()],
            },
            paging: Paging {
                from_supply_order_id: 0,
                limit: PAGE_LIMIT,
            },
        }
    }

    /// Smallest ready-to-supply search, used to check credentials.
    pub fn credential_check() -> Self {
        Self {
            filter: SearchFilter {
                order_number_search: None,
                states: vec![READY_TO_SUPPLY.to_string()],
            },
            paging: Paging {
                from_supply_order_id: 0,
                limit: 1,
            },
        }
    }
}

/// Body of the order-request detail call.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandRequest {
    /// Order-request identifiers.
    pub order_ids: Vec<i64>,
}

/// Identifier that the API sends either as a string or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    /// Textual identifier.
    Text(String),
    /// Numeric identifier.
    Number(i64),
}

impl FlexibleId {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for FlexibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// One order-request as returned by the detail call.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    /// Order-request identifier.
    #[serde(default)]
    pub supply_order_id: Option<i64>,

    /// Warehouse the goods are dropped off at.
    #[serde(default)]
    pub drop_off_warehouse: Option<WarehouseRef>,

    /// Shipment units of this order-request.
    #[serde(default)]
    pub supplies: Vec<SubSupply>,
}

/// Reference to a warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseRef {
    /// Warehouse identifier.
    #[serde(default)]
    pub warehouse_id: Option<i64>,
}

/// One shipment unit inside an order-request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubSupply {
    /// Bundle holding the unit's contents.
    #[serde(default)]
    pub bundle_id: Option<FlexibleId>,

    /// Storage warehouse of the unit.
    #[serde(default)]
    pub storage_warehouse_id: Option<i64>,

    /// Supply identifier, for logging.
    #[serde(default)]
    pub supply_id: Option<i64>,
}

/// Complete address of a bundle-contents query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleAddress {
    /// Bundle identifier.
    pub bundle_id: FlexibleId,
    /// Drop-off warehouse identifier.
    pub dropoff_warehouse_id: i64,
    /// Storage warehouse identifier.
    pub storage_warehouse_id: i64,
}

impl OrderRequest {
    /// Drop-off warehouse identifier, if present.
    pub fn dropoff_warehouse_id(&self) -> Option<i64> {
        self.drop_off_warehouse
            .as_ref()
            .and_then(|warehouse| warehouse.warehouse_id)
    }
}

impl SubSupply {
    /// Combine with the order's drop-off warehouse into a full address.
    ///
    /// Returns `None` when any of the three identifiers is missing.
    pub fn address(&self, dropoff_warehouse_id: Option<i64>) -> Option<BundleAddress> {
        let bundle_id = self.bundle_id.clone().filter(|id| !id.is_blank())?;

        Some(BundleAddress {
            bundle_id,
            dropoff_warehouse_id: dropoff_warehouse_id?,
            storage_warehouse_id: self.storage_warehouse_id?,
        })
    }
}

/// Body of the bundle-contents call.
#[derive(Debug, Clone, Serialize)]
pub struct BundleRequest {
    /// Bundles to list.
    pub bundle_ids: Vec<FlexibleId>,
    /// Drop-off warehouse.
    pub dropoff_warehouse_id: i64,
    /// Storage warehouses.
    pub storage_warehouse_ids: Vec<i64>,
    /// Sort direction.
    pub is_asc: bool,
    /// Page size.
    pub limit: u32,
    /// Free-text item filter; empty matches everything.
    pub query: String,
    /// Cursor from the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
}

impl BundleRequest {
    /// First page for `address`.
    pub fn new(address: &BundleAddress) -> Self {
        Self {
            bundle_ids: vec![address.bundle_id.clone()],
            dropoff_warehouse_id: address.dropoff_warehouse_id,
            storage_warehouse_ids: vec![address.storage_warehouse_id],
            is_asc: true,
            limit: PAGE_LIMIT,
            query: String::new(),
            last_id: None,
        }
    }

    /// Same query, continuing after `last_id`.
    pub fn after(&self, last_id: String) -> Self {
        Self {
            last_id: Some(last_id),
            ..self.clone()
        }
    }
}

/// Body of the bundle call addressed by supply id.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyBundleRequest {
    /// Supply identifier.
    pub supply_id: i64,
}
