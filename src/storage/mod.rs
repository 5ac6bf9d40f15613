//! Local trading database collaborator.
//!
//! Defines the `LocalStore` trait the pipeline reconciles against, and an
//! SQLite adapter in [`sqlite`] for an existing trading-tool database.
//! This crate never creates or migrates that database.

pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::types::{PriceLine, StationFields, StationRecord, StoredPrice};

/// Table names passed to [`LocalStore::export_table`].
pub const STATION_TABLE: &str = "Station";
pub const SHIP_VENDOR_TABLE: &str = "ShipVendor";

/// Abstraction over the local trading database.
///
/// Every call is a synchronous step of one reconciliation; failures are
/// fatal for the current run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Find a station by system and station name (case-insensitive).
    async fn lookup_station(&self, system: &str, name: &str) -> Result<Option<StationRecord>>;

    /// Insert a new station and return it with its assigned id.
    async fn add_station(
        &self,
        system: &str,
        name: &str,
        fields: &StationFields,
    ) -> Result<StationRecord>;

    /// Overwrite the reconciled fields of an existing station.
    async fn update_station(&self, station: &StationRecord, fields: &StationFields) -> Result<()>;

    /// Resolve a local ship name to its id. Unknown ships are an error.
    async fn lookup_ship(&self, name: &str) -> Result<i64>;

    async fn upsert_ship_vendor(&self, ship_id: i64, station_id: i64) -> Result<()>;

    /// Prices currently stored for a station, keyed by item name.
    async fn station_prices(&self, station_id: i64) -> Result<HashMap<String, StoredPrice>>;

    /// Replace the station's market with the given lines. Returns the
    /// number of lines written; items the store does not know are skipped.
    async fn import_market(&self, station_id: i64, lines: &[PriceLine]) -> Result<usize>;

    /// Signal that a table changed and its export snapshot should be refreshed.
    async fn export_table(&self, table: &str) -> Result<()>;
}
