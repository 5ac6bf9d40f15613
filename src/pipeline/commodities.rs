//! Commodity market normalization.
//!
//! Filters the raw `lastStarport.commodities` list, corrects names and
//! categories for the local trading tool, and coerces every number.

use serde_json::Value;
use tracing::debug;

use super::coerce::{coerce_bracket, coerce_int, coerce_proportion};
use crate::tables;
use crate::types::{CommodityRecord, EconomyRecord};

/// Why a commodity was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    IgnoredCategory,
    Illegal,
    IgnoredCommodity,
}

/// Apply the filters in order: category, legality, name.
pub fn rejection(item: &Value) -> Option<Rejection> {
    let category = item["categoryname"].as_str().unwrap_or_default();
    if tables::is_ignored_category(category) {
        return Some(Rejection::IgnoredCategory);
    }
    // Only an absent or empty marker is legal. Null and non-strings are not.
    let legal = match item.get("legality") {
        None => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if !legal {
        return Some(Rejection::Illegal);
    }
    let name = item["name"].as_str().unwrap_or_default();
    if tables::is_ignored_commodity(name) {
        return Some(Rejection::IgnoredCommodity);
    }
    None
}

fn status_flags(item: &Value) -> Vec<String> {
    item["statusFlags"]
        .as_array()
        .map(|flags| {
            flags
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Build a record from one surviving market entry.
pub fn to_record(item: &Value) -> CommodityRecord {
    let service_name = item["name"].as_str().unwrap_or_default();
    let category = item["categoryname"].as_str().unwrap_or_default();

    CommodityRecord {
        name: tables::corrected_commodity(service_name).to_string(),
        service_name: service_name.to_string(),
        category: tables::corrected_category(category).to_string(),
        mean_price: coerce_int(item.get("meanPrice")).value(),
        buy_price: coerce_int(item.get("buyPrice")).value(),
        sell_price: coerce_int(item.get("sellPrice")).value(),
        stock: coerce_int(item.get("stock")).value(),
        stock_bracket: coerce_bracket(item.get("stockBracket")),
        demand: coerce_int(item.get("demand")).value(),
        demand_bracket: coerce_bracket(item.get("demandBracket")),
        status_flags: status_flags(item),
    }
}

/// Normalize the commodities section. Entries without a name are skipped.
pub fn normalize_commodities(section: &Value) -> Vec<CommodityRecord> {
    let Some(items) = section.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item["name"].is_string())
        .filter(|item| match rejection(item) {
            Some(reason) => {
                debug!(name = ?item["name"], ?reason, "Commodity dropped");
                false
            }
            None => true,
        })
        .map(to_record)
        .collect()
}

/// Station economies, in the service's key order.
pub fn normalize_economies(section: Option<&Value>) -> Vec<EconomyRecord> {
    let Some(economies) = section.and_then(Value::as_object) else {
        return Vec::new();
    };

    economies
        .values()
        .filter_map(|e| {
            let name = e["name"].as_str()?;
            Some(EconomyRecord {
                name: name.to_string(),
                proportion: coerce_proportion(e.get("proportion")).value(),
            })
        })
        .collect()
}

/// Commodities the station prohibits. The service sends either a map of
/// id → name or a plain list.
pub fn prohibited(section: Option<&Value>) -> Vec<String> {
    let names: Vec<&Value> = match section {
        Some(Value::Object(m)) => m.values().collect(),
        Some(Value::Array(a)) => a.iter().collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
