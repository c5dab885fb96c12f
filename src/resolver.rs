//! Order resolution.
//!
//! Turns a human-facing order number into a flat, quantity-bearing item list
//! through three sequential remote calls:
//!
//! 1. **search** the ready-to-supply order-requests matching the number,
//! 2. **expand** all matches into order-request details in one batch,
//! 3. **fetch** the bundle contents of every fully addressed sub-supply.
//!
//! Items from all order-requests and sub-supplies are concatenated in remote
//! order without deduplication.
//!
//! # Examples
//!
//! ```no_run
//! use ozon_labels::api::HttpTransport;
//! use ozon_labels::config::Credentials;
//! use ozon_labels::resolver::OrderResolver;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("12345", "api-key")?;
//! let transport = HttpTransport::new(
//!     "https://api-seller.ozon.ru",
//!     &credentials,
//!     Duration::from_secs(30),
//! )?;
//! let resolver = OrderResolver::new(transport);
//! let order = resolver.resolve("2000038642317").await?;
//! println!("{} labels to print", order.total_quantity);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::api::shape;
use crate::api::types::{
    BundleAddress, BundleRequest, ExpandRequest, OrderRequest, SearchRequest, SupplyBundleRequest,
};
use crate::api::{BUNDLE_ENDPOINT, EXPAND_ENDPOINT, HttpTransport, SEARCH_ENDPOINT, Transport};
use crate::config::Config;
use crate::error::{ConfigError, ResolutionError, Stage};
use crate::model::{OrderItem, ResolvedOrder};

/// Resolves order numbers and supply ids into item lists.
#[derive(Clone)]
pub struct OrderResolver {
    transport: Arc<dyn Transport>,
    span: Span,
}

impl OrderResolver {
    /// Create a resolver on top of `transport`.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Create a resolver sharing an existing transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            span: info_span!("resolver"),
        }
    }

    /// Create a resolver talking HTTP with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are missing or malformed.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(HttpTransport::from_config(config)?))
    }

    /// Resolve an order number through search, expand and bundle calls.
    ///
    /// # Errors
    ///
    /// Fails on any transport error, on a response of unknown shape, when the
    /// search or expand stage comes back empty, and when no sub-supply yields
    /// a single item.
    pub async fn resolve(&self, order_number: &str) -> Result<ResolvedOrder, ResolutionError> {
        self.resolve_order_number(order_number)
            .instrument(self.span.clone())
            .await
    }

    /// Resolve a known supply directly, skipping search and expand.
    pub async fn resolve_by_supply_id(
        &self,
        supply_id: i64,
    ) -> Result<ResolvedOrder, ResolutionError> {
        self.resolve_supply(supply_id)
            .instrument(self.span.clone())
            .await
    }

    /// Check the credentials with a minimal search.
    ///
    /// Never fails: rejected credentials and every other failure are logged
    /// and reported as `false`.
    pub async fn validate_credentials(&self) -> bool {
        async {
            match self
                .call(Stage::Credentials, SEARCH_ENDPOINT, &SearchRequest::credential_check())
                .await
            {
                Ok(_) => {
                    info!("API credentials are valid");
                    true
                }
                Err(ResolutionError::Transport { source, .. }) if source.is_unauthorized() => {
                    error!(%source, "API credentials were rejected");
                    false
                }
                Err(err) => {
                    error!(%err, "credential check failed");
                    false
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn resolve_order_number(
        &self,
        order_number: &str,
    ) -> Result<ResolvedOrder, ResolutionError> {
        info!(order_number, "resolving order");

        let order_ids = self.search(order_number).await?;
        info!(?order_ids, "matched order-requests");

        let orders = self.expand(&order_ids).await?;

        let mut items = Vec::new();
        for order in &orders {
            let order_id = order.supply_order_id;

            if order.supplies.is_empty() {
                warn!(?order_id, "order-request has no supplies, skipping");
                continue;
            }

            let dropoff_warehouse_id = order.dropoff_warehouse_id();
            for supply in &order.supplies {
                let Some(address) = supply.address(dropoff_warehouse_id) else {
                    warn!(
                        ?order_id,
                        supply_id = ?supply.supply_id,
                        bundle_id = ?supply.bundle_id,
                        ?dropoff_warehouse_id,
                        storage_warehouse_id = ?supply.storage_warehouse_id,
                        "sub-supply is missing identifiers, skipping"
                    );
                    continue;
                };

                let bundle_items = self.fetch_bundle(&address).await?;
                info!(
                    ?order_id,
                    bundle_id = %address.bundle_id,
                    count = bundle_items.len(),
                    "bundle contents received"
                );
                items.extend(bundle_items);
            }
        }

        if items.is_empty() {
            return Err(ResolutionError::NoItems {
                reference: order_number.to_string(),
            });
        }

        Ok(finish(ResolvedOrder::new(order_number, order_ids, items)))
    }

    async fn resolve_supply(&self, supply_id: i64) -> Result<ResolvedOrder, ResolutionError> {
        info!(supply_id, "resolving supply");

        let response = self
            .call(Stage::Supply, BUNDLE_ENDPOINT, &SupplyBundleRequest { supply_id })
            .await?;
        let items: Vec<OrderItem> = shape::extract(&response, "items", Stage::Supply)?;

        if items.is_empty() {
            return Err(ResolutionError::NoItems {
                reference: supply_id.to_string(),
            });
        }

        Ok(finish(ResolvedOrder::new(
            supply_id.to_string(),
            Vec::new(),
            items,
        )))
    }

    async fn search(&self, order_number: &str) -> Result<Vec<i64>, ResolutionError> {
        let request = SearchRequest::by_order_number(order_number);
        let response = self.call(Stage::Search, SEARCH_ENDPOINT, &request).await?;

        let order_ids: Vec<i64> = shape::extract(&response, "order_ids", Stage::Search)?;
        if order_ids.is_empty() {
            return Err(ResolutionError::NoMatchingOrders {
                order_number: order_number.to_string(),
            });
        }

        Ok(order_ids)
    }

    async fn expand(&self, order_ids: &[i64]) -> Result<Vec<OrderRequest>, ResolutionError> {
        let request = ExpandRequest {
            order_ids: order_ids.to_vec(),
        };
        let response = self.call(Stage::Expand, EXPAND_ENDPOINT, &request).await?;

        let orders: Vec<OrderRequest> = shape::extract(&response, "orders", Stage::Expand)?;
        if orders.is_empty() {
            return Err(ResolutionError::NoOrderDetails {
                order_ids: order_ids.to_vec(),
            });
        }

        Ok(orders)
    }

    async fn fetch_bundle(&self, address: &BundleAddress) -> Result<Vec<OrderItem>, ResolutionError> {
        let mut request = BundleRequest::new(address);
        let mut items = Vec::new();

        loop {
            let response = self.call(Stage::Bundle, BUNDLE_ENDPOINT, &request).await?;
            let container = shape::locate_container(&response, "items", Stage::Bundle)?;
            let page: Vec<OrderItem> = shape::decode_field(container, "items", Stage::Bundle)?;
            items.extend(page);

            let has_next = container
                .get("has_next")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let last_id = container
                .get("last_id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty());

            match last_id {
                Some(last_id) if has_next && request.last_id.as_deref() != Some(last_id) => {
                    request = request.after(last_id.to_string());
                }
                _ => break,
            }
        }

        Ok(items)
    }

    async fn call<B: Serialize>(
        &self,
        stage: Stage,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ResolutionError> {
        let body = serde_json::to_value(body).map_err(|err| ResolutionError::InvalidRecord {
            stage,
            field: "request",
            reason: err.to_string(),
        })?;

        self.transport
            .post(endpoint, &body)
            .await
            .map_err(|source| {
                error!(%stage, endpoint, %source, "remote call failed");
                ResolutionError::Transport {
                    stage,
                    endpoint: endpoint.to_string(),
                    source,
                }
            })
    }
}

fn finish(order: ResolvedOrder) -> ResolvedOrder {
    info!(
        order_number = %order.order_number,
        unique_items = order.total_unique,
        total_quantity = order.total_quantity,
        "order resolved"
    );
    order
}
