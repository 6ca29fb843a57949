use sales_core::{ItemKind, SaleItem, normalize_product_id};
use serde::Deserialize;
use serde_json::Value;

use crate::normalize::{api_row_id, parse_api_timestamp, value_as_text, value_is_true};

pub(crate) const LOGIN_PATH: &str = "/authentication/v1/authentication/login";
pub(crate) const ORDERS_BULK_PATH: &str = "/orders/v2/ordersBulk";
pub(crate) const RESTAURANT_HEADER: &str = "Toast-Restaurant-External-ID";

/// PLU recorded for an order that carries no item selections.
pub const GENERIC_ORDER_PLU: &str = "9999";

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<LoginToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginToken {
    pub access_token: Option<String>,
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(value_is_true)
}

fn selection_product_id(selection: &Value) -> Option<String> {
    ["plu", "sku"]
        .iter()
        .filter_map(|key| selection.get(*key))
        .chain(selection.get("item").and_then(|item| item.get("guid")))
        .chain(selection.get("itemGuid"))
        .filter_map(value_as_text)
        .map(|value| normalize_product_id(&value))
        .find(|value| !value.is_empty())
}

fn order_selections(order: &Value) -> Vec<&Value> {
    let mut selections = Vec::new();
    if let Some(checks) = order.get("checks").and_then(Value::as_array) {
        for check in checks {
            if flag(check, "voided") || flag(check, "deleted") {
                continue;
            }
            if let Some(items) = check.get("selections").and_then(Value::as_array) {
                selections.extend(items);
            }
        }
    }
    if let Some(items) = order.get("selections").and_then(Value::as_array) {
        selections.extend(items);
    }
    selections
}

/// Turns an `ordersBulk` page into line items. Voided orders and voided
/// selections are skipped. An order with no selections counts once under
/// [`GENERIC_ORDER_PLU`].
pub(crate) fn items_from_orders(orders: &[Value], location: &str) -> Vec<SaleItem> {
    let mut items = Vec::new();
    for (order_index, order) in orders.iter().enumerate() {
        if flag(order, "voided") || flag(order, "deleted") {
            continue;
        }
        let Some(timestamp) = ["openedDate", "paidDate", "closedDate"]
            .iter()
            .filter_map(|key| order.get(*key).and_then(Value::as_str))
            .find_map(parse_api_timestamp)
        else {
            tracing::warn!(order = ?order.get("guid"), "skipping toast order without a date");
            continue;
        };
        let order_guid = order
            .get("guid")
            .and_then(value_as_text)
            .filter(|guid| !guid.is_empty())
            .unwrap_or_else(|| format!("order#{}", order_index));

        let selections = order_selections(order);
        if selections.is_empty() {
            items.push(SaleItem {
                id: api_row_id("toast-order", location, &order_guid),
                kind: ItemKind::LineItem,
                product_id: GENERIC_ORDER_PLU.to_string(),
                quantity: 1.0,
                timestamp,
                location: location.to_string(),
            });
            continue;
        }

        for (index, selection) in selections.into_iter().enumerate() {
            if flag(selection, "voided") {
                continue;
            }
            let Some(product_id) = selection_product_id(selection) else {
                continue;
            };
            let quantity = selection
                .get("quantity")
                .and_then(Value::as_f64)
                .unwrap_or(1.0);
            let key = selection
                .get("guid")
                .and_then(value_as_text)
                .unwrap_or_else(|| format!("{}#{}", order_guid, index));
            items.push(SaleItem {
                id: api_row_id("toast-selection", location, &key),
                kind: ItemKind::LineItem,
                product_id,
                quantity,
                timestamp,
                location: location.to_string(),
            });
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selections_become_line_items() {
        let orders = vec![
            json!({
                "guid": "o1",
                "openedDate": "2024-07-01T11:05:00.000+0000",
                "checks": [{
                    "selections": [
                        {"guid": "s1", "item": {"guid": "81831"}, "quantity": 2.0},
                        {"guid": "s2", "itemGuid": "2307", "quantity": 1.0, "voided": true},
                        {"guid": "s3", "plu": "2307"}
                    ]
                }]
            }),
            json!({"guid": "o2", "voided": true, "openedDate": "2024-07-01T12:00:00.000+0000"}),
            json!({"guid": "o3", "openedDate": "2024-07-01T18:30:00.000+0000"}),
        ];
        let items = items_from_orders(&orders, "Covington");
        let plus = items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity))
            .collect::<Vec<_>>();
        assert_eq!(plus, vec![("81831", 2.0), ("2307", 1.0), (GENERIC_ORDER_PLU, 1.0)]);
        assert!(items.iter().all(|item| item.location == "Covington"));
    }

    #[test]
    fn selection_ids_are_stable() {
        let orders = vec![json!({
            "guid": "o1",
            "openedDate": "2024-07-01T11:05:00.000+0000",
            "selections": [{"guid": "s1", "itemGuid": "100"}]
        })];
        let first = items_from_orders(&orders, "Kenner");
        let second = items_from_orders(&orders, "Kenner");
        assert_eq!(first[0].id, second[0].id);
    }
}
