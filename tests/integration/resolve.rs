//! Order resolution against a scripted Seller API.

use rstest::rstest;
use serde_json::{Value, json};

use ozon_labels::api::{BUNDLE_ENDPOINT, EXPAND_ENDPOINT, SEARCH_ENDPOINT};
use ozon_labels::error::{ResolutionError, Stage, TransportError};
use ozon_labels::resolver::OrderResolver;

use crate::common::{ORDER_NUMBER, ScriptedTransport, order_script};

fn sku_quantities(order: &ozon_labels::ResolvedOrder) -> Vec<(u64, u32)> {
    order
        .items
        .iter()
        .map(|item| (item.sku, item.quantity))
        .collect()
}

#[tokio::test]
async fn test_resolve_order_number() {
    let transport = order_script();
    let resolver = OrderResolver::new(transport.clone());

    let order = resolver.resolve(ORDER_NUMBER).await.unwrap();

    assert_eq!(order.order_number, ORDER_NUMBER);
    assert_eq!(order.order_ids, vec![5001]);
    assert_eq!(sku_quantities(&order), vec![(111, 2), (222, 1)]);
    assert_eq!(order.total_unique, 2);
    assert_eq!(order.total_quantity, 3);

    let endpoints: Vec<String> = transport.requests().into_iter().map(|(e, _)| e).collect();
    assert_eq!(endpoints, [SEARCH_ENDPOINT, EXPAND_ENDPOINT, BUNDLE_ENDPOINT]);
}

#[rstest]
#[case::flat(json!({"order_ids": [1]}), json!({"orders": []}))]
#[case::nested(json!({"result": {"order_ids": [1]}}), json!({"result": {"orders": []}}))]
#[tokio::test]
async fn test_both_response_shapes_are_accepted(#[case] search: Value, #[case] expand_template: Value) {
    let order = json!({
        "drop_off_warehouse": {"warehouse_id": 3},
        "supplies": [{"bundle_id": 9, "storage_warehouse_id": 4}]
    });
    let mut expand = expand_template;
    match expand.get_mut("result") {
        Some(result) => result["orders"] = json!([order]),
        None => expand["orders"] = json!([order]),
    }

    let transport = ScriptedTransport::new()
        .ok(SEARCH_ENDPOINT, search)
        .ok(EXPAND_ENDPOINT, expand)
        .ok(
            BUNDLE_ENDPOINT,
            json!({"result": {"items": [{"sku": 7, "quantity": 3}], "has_next": false}}),
        );

    let order = OrderResolver::new(transport).resolve("1").await.unwrap();
    assert_eq!(sku_quantities(&order), vec![(7, 3)]);
}

#[tokio::test]
async fn test_resolving_twice_gives_the_same_items() {
    let first = OrderResolver::new(order_script())
        .resolve(ORDER_NUMBER)
        .await
        .unwrap();
    let second = OrderResolver::new(order_script())
        .resolve(ORDER_NUMBER)
        .await
        .unwrap();

    assert_eq!(first.items, second.items);
    assert_eq!(first.total_unique, second.total_unique);
    assert_eq!(first.total_quantity, second.total_quantity);
}

#[tokio::test]
async fn test_duplicate_skus_across_order_requests_are_kept() {
    let transport = ScriptedTransport::new()
        .ok(SEARCH_ENDPOINT, json!({"order_ids": [1, 2]}))
        .ok(
            EXPAND_ENDPOINT,
            json!({"orders": [
                {"drop_off_warehouse": {"warehouse_id": 3}, "supplies": [{"bundle_id": "a", "storage_warehouse_id": 4}]},
                {"drop_off_warehouse": {"warehouse_id": 3}, "supplies": [{"bundle_id": "b", "storage_warehouse_id": 5}]}
            ]}),
        )
        .ok(BUNDLE_ENDPOINT, json!({"items": [{"sku": 111, "quantity": 2}]}))
        .ok(BUNDLE_ENDPOINT, json!({"items": [{"sku": 111, "quantity": 4}]}));

    let order = OrderResolver::new(transport).resolve("1").await.unwrap();

    assert_eq!(sku_quantities(&order), vec![(111, 2), (111, 4)]);
    assert_eq!(order.total_unique, 2);
    assert_eq!(order.total_quantity, 6);
}

#[tokio::test]
async fn test_empty_search_fails() {
    let transport = ScriptedTransport::new()
        .ok(SEARCH_ENDPOINT, json!({"order_ids": []}))
        .ok(EXPAND_ENDPOINT, json!({"orders": []}));

    let err = OrderResolver::new(transport.clone())
        .resolve(ORDER_NUMBER)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::NoMatchingOrders { .. }));
    assert!(err.to_string().contains(ORDER_NUMBER));
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test]
async fn test_rejected_credentials_fail_the_search() {
    let transport = ScriptedTransport::new().fail(
        SEARCH_ENDPOINT,
        TransportError::Unauthorized {
            status: 401,
            body: "invalid Api-Key".to_string(),
        },
    );

    let err = OrderResolver::new(transport)
        .resolve(ORDER_NUMBER)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Search));
    match err {
        ResolutionError::Transport { endpoint, source, .. } => {
            assert_eq!(endpoint, SEARCH_ENDPOINT);
            assert!(source.is_unauthorized());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_by_supply_id() {
    let transport = ScriptedTransport::new().ok(
        BUNDLE_ENDPOINT,
        json!({"items": [{"sku": 111, "quantity": 2}, {"sku": 222}]}),
    );

    let order = OrderResolver::new(transport.clone())
        .resolve_by_supply_id(7001)
        .await
        .unwrap();

    assert_eq!(order.order_number, "7001");
    assert!(order.order_ids.is_empty());
    assert_eq!(sku_quantities(&order), vec![(111, 2), (222, 1)]);
    assert_eq!(transport.requests()[0].1, json!({"supply_id": 7001}));
}

#[tokio::test]
async fn test_validate_credentials() {
    let valid = OrderResolver::new(ScriptedTransport::new().ok(SEARCH_ENDPOINT, json!({"order_ids": []})));
    assert!(valid.validate_credentials().await);

    let rejected = OrderResolver::new(ScriptedTransport::new().fail(
        SEARCH_ENDPOINT,
        TransportError::Unauthorized {
            status: 403,
            body: String::new(),
        },
    ));
    assert!(!rejected.validate_credentials().await);

    let timed_out =
        OrderResolver::new(ScriptedTransport::new().fail(SEARCH_ENDPOINT, TransportError::Timeout));
    assert!(!timed_out.validate_credentials().await);
}
