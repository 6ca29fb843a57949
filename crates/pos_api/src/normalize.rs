use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime};
use sales_core::{CategoryRule, ItemKind, SaleItem, normalize_product_id, parse_timestamp};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{PosApiError, Result};

const PRODUCT_ID_KEYS: &[&str] = &["item_id", "product_id", "plu_code", "plu", "PLU"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "Qty"];
const TIMESTAMP_KEYS: &[&str] = &["order_time", "transaction_time", "timestamp", "Order Date"];
const LOCATION_KEYS: &[&str] = &[
    "location",
    "store_location",
    "location_name",
    "store_name",
    "Location",
];
const VOID_KEYS: &[&str] = &["is_void", "voided", "Void?"];
const RECORD_ID_KEYS: &[&str] = &["line_id", "id", "guid", "transaction_id"];

fn first<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn value_is_true(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_i64() == Some(1),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}

/// Vendor timestamps, including Toast's `+0000` offsets, as wall-clock time.
pub(crate) fn parse_api_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map(|parsed| parsed.naive_local())
        .ok()
        .or_else(|| parse_timestamp(raw))
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

pub(crate) fn api_row_id(prefix: &str, location: &str, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(b":");
    hasher.update(location.as_bytes());
    hasher.update(b":");
    hasher.update(key.as_bytes());
    hex_digest(&hasher.finalize())
}

/// Sales endpoints answer with a bare array or `{"data": [...]}`.
pub(crate) fn records_from_body(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(PosApiError::Decode(
                "expected a list of sales records or an object with `data`".to_string(),
            )),
        },
        _ => Err(PosApiError::Decode(
            "expected a list of sales records".to_string(),
        )),
    }
}

/// Identity of a record before occurrence numbering: the vendor's id when it
/// sends one, otherwise the record's full content.
fn record_key(record: &Map<String, Value>) -> String {
    match first(record, RECORD_ID_KEYS).and_then(value_as_text) {
        Some(id) if !id.is_empty() => format!("id:{}", id),
        _ => format!("record:{}", Value::Object(record.clone())),
    }
}

/// Maps a page of generic sales records, returning the kept items and the
/// number dropped. Records sharing a key are numbered in response order, so
/// identical sales stay distinct and a repeated pull yields the same ids.
pub(crate) fn items_from_records(
    records: &[Value],
    fallback_location: &str,
) -> (Vec<SaleItem>, usize) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut items = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        let occurrence = match record.as_object() {
            Some(object) => {
                let count = seen.entry(record_key(object)).or_insert(0);
                *count += 1;
                *count - 1
            }
            None => 0,
        };
        match sale_item_from_record(record, fallback_location, occurrence) {
            Some(item) => items.push(item),
            None => dropped += 1,
        }
    }
    (items, dropped)
}

/// Maps one generic sales record. Voided records and records without a PLU or
/// a readable timestamp yield `None`. `occurrence` tells apart records that
/// share a key within one response.
fn sale_item_from_record(
    record: &Value,
    fallback_location: &str,
    occurrence: usize,
) -> Option<SaleItem> {
    let record = record.as_object()?;
    if first(record, VOID_KEYS).is_some_and(value_is_true) {
        return None;
    }
    let product_id = first(record, PRODUCT_ID_KEYS)
        .and_then(value_as_text)
        .map(|value| normalize_product_id(&value))
        .filter(|value| !value.is_empty())?;
    let quantity = match first(record, QUANTITY_KEYS) {
        Some(value) => value_as_f64(value)?,
        None => 1.0,
    };
    let timestamp = first(record, TIMESTAMP_KEYS)
        .and_then(value_as_text)
        .and_then(|raw| parse_api_timestamp(&raw))?;
    let location = first(record, LOCATION_KEYS)
        .and_then(value_as_text)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback_location.trim().to_string());
    if location.is_empty() {
        return None;
    }
    let key = format!("{}#{}", record_key(record), occurrence);
    Some(SaleItem {
        id: api_row_id("api", &location, &key),
        kind: ItemKind::LineItem,
        product_id,
        quantity,
        timestamp,
        location,
    })
}

/// Decodes `{"Category": [plu, ...]}`. PLUs may be numbers or strings.
pub(crate) fn rules_from_body(body: &Value) -> Result<Vec<CategoryRule>> {
    let Some(object) = body.as_object() else {
        return Err(PosApiError::Decode(
            "expected an object of category to PLU lists".to_string(),
        ));
    };
    let mut rules = Vec::with_capacity(object.len());
    for (category, plus) in object {
        let Some(plus) = plus.as_array() else {
            return Err(PosApiError::Decode(format!(
                "category `{}` is not a list of PLUs",
                category
            )));
        };
        rules.push(CategoryRule {
            category: category.clone(),
            product_ids: plus
                .iter()
                .filter_map(value_as_text)
                .map(|value| normalize_product_id(&value))
                .filter(|value| !value.is_empty())
                .collect(),
        });
    }
    Ok(rules)
}
