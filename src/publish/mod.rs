//! Event-network payloads and the publisher seam.
//!
//! The pipeline builds the three message kinds here; a [`Publisher`] only
//! wraps and delivers them. [`eddn`] holds the HTTP implementation.

pub mod eddn;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::types::{CommodityRecord, EconomyRecord, ModuleRecord, OutfittingEntry};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One market line as published. Brackets stay ordinals and the sell
/// price is the coerced service price, never the display override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityEntry {
    pub name: String,
    pub mean_price: i64,
    pub buy_price: i64,
    pub stock: i64,
    pub stock_bracket: u8,
    pub sell_price: i64,
    pub demand: i64,
    pub demand_bracket: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status_flags: Vec<String>,
}

impl From<&CommodityRecord> for CommodityEntry {
    fn from(c: &CommodityRecord) -> Self {
        Self {
            name: c.service_name.clone(),
            mean_price: c.mean_price,
            buy_price: c.buy_price,
            stock: c.stock,
            stock_bracket: c.stock_bracket,
            sell_price: c.sell_price,
            demand: c.demand,
            demand_bracket: c.demand_bracket,
            status_flags: c.status_flags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityMessage {
    pub system_name: String,
    pub station_name: String,
    pub timestamp: String,
    pub commodities: Vec<CommodityEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub economies: Vec<EconomyRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prohibited: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipyardMessage {
    pub system_name: String,
    pub station_name: String,
    pub timestamp: String,
    /// Network ship names, sorted.
    pub ships: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfittingMessage {
    pub system_name: String,
    pub station_name: String,
    pub timestamp: String,
    pub modules: Vec<ModuleRecord>,
}

/// ISO-8601 UTC with second precision, as the network expects.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn commodity_message(
    system: &str,
    station: &str,
    at: DateTime<Utc>,
    commodities: &[CommodityRecord],
    economies: &[EconomyRecord],
    prohibited: &[String],
) -> CommodityMessage {
    CommodityMessage {
        system_name: system.to_string(),
        station_name: station.to_string(),
        timestamp: format_timestamp(at),
        commodities: commodities.iter().map(CommodityEntry::from).collect(),
        economies: economies.to_vec(),
        prohibited: prohibited.to_vec(),
    }
}

pub fn shipyard_message(
    system: &str,
    station: &str,
    at: DateTime<Utc>,
    network_names: Vec<String>,
) -> ShipyardMessage {
    ShipyardMessage {
        system_name: system.to_string(),
        station_name: station.to_string(),
        timestamp: format_timestamp(at),
        ships: network_names,
    }
}

pub fn outfitting_message(
    system: &str,
    station: &str,
    at: DateTime<Utc>,
    modules: &[OutfittingEntry],
) -> OutfittingMessage {
    OutfittingMessage {
        system_name: system.to_string(),
        station_name: station.to_string(),
        timestamp: format_timestamp(at),
        modules: modules.iter().map(|m| m.module.clone()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Sink for pre-built messages. Delivery is the implementor's concern.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_commodities(&self, message: &CommodityMessage) -> Result<()>;

    async fn publish_shipyard(&self, message: &ShipyardMessage) -> Result<()>;

    async fn publish_outfitting(&self, message: &OutfittingMessage) -> Result<()>;
}
