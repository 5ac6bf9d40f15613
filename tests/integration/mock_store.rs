//! In-memory collaborators for integration testing.
//!
//! `MockStore` is a deterministic `LocalStore` holding stations, ships,
//! vendors and prices in memory, and logging every write. `RecordingPublisher`
//! keeps every payload it is handed as JSON.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use edapi::publish::{CommodityMessage, OutfittingMessage, Publisher, ShipyardMessage};
use edapi::storage::LocalStore;
use edapi::types::*;

#[derive(Default)]
struct StoreState {
    stations: Vec<StationRecord>,
    vendors: Vec<(i64, i64)>,
    prices: HashMap<i64, HashMap<String, StoredPrice>>,
    markets: HashMap<i64, Vec<PriceLine>>,
    writes: Vec<String>,
    exports: Vec<String>,
}

/// A mock trading database.
#[derive(Clone)]
pub struct MockStore {
    ships: HashMap<String, i64>,
    state: Arc<Mutex<StoreState>>,
    /// If set, every operation returns this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockStore {
    /// Empty store that knows the ships used across the tests.
    pub fn new() -> Self {
        let ships = [("Sidewinder", 1), ("Cobra", 2), ("Adder", 3), ("Viper", 4)]
            .into_iter()
            .map(|(n, id)| (n.to_string(), id))
            .collect();
        Self {
            ships,
            state: Arc::new(Mutex::new(StoreState::default())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Store with one fully known station.
    pub fn with_station(system: &str, name: &str, id: i64) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().stations.push(StationRecord {
            id,
            system: system.to_string(),
            name: name.to_string(),
            fields: StationFields {
                ls_from_star: 1100,
                black_market: Flag::No,
                max_pad_size: PadSize::Large,
                market: Flag::Yes,
                shipyard: Flag::Yes,
                outfitting: Flag::Yes,
                rearm: Flag::Yes,
                refuel: Flag::Yes,
                repair: Flag::Yes,
            },
        });
        store
    }

    pub fn set_price(&self, station_id: i64, item: &str, sell_price: i64, buy_price: i64) {
        self.state
            .lock()
            .unwrap()
            .prices
            .entry(station_id)
            .or_default()
            .insert(
                item.to_string(),
                StoredPrice {
                    sell_price,
                    buy_price,
                },
            );
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn exports(&self) -> Vec<String> {
        self.state.lock().unwrap().exports.clone()
    }

    pub fn vendors(&self) -> Vec<(i64, i64)> {
        self.state.lock().unwrap().vendors.clone()
    }

    pub fn market(&self, station_id: i64) -> Vec<PriceLine> {
        self.state
            .lock()
            .unwrap()
            .markets
            .get(&station_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn stations(&self) -> Vec<StationRecord> {
        self.state.lock().unwrap().stations.clone()
    }

    fn check_error(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocalStore for MockStore {
    async fn lookup_station(&self, system: &str, name: &str) -> Result<Option<StationRecord>> {
        self.check_error()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .stations
            .iter()
            .find(|s| s.system.eq_ignore_ascii_case(system) && s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn add_station(
        &self,
        system: &str,
        name: &str,
        fields: &StationFields,
    ) -> Result<StationRecord> {
        self.check_error()?;
        let mut state = self.state.lock().unwrap();
        let id = state.stations.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let record = StationRecord {
            id,
            system: system.to_string(),
            name: name.to_string(),
            fields: *fields,
        };
        state.stations.push(record.clone());
        state.writes.push(format!("add_station {system}/{name}"));
        Ok(record)
    }

    async fn update_station(&self, station: &StationRecord, fields: &StationFields) -> Result<()> {
        self.check_error()?;
        let mut state = self.state.lock().unwrap();
        let Some(existing) = state.stations.iter_mut().find(|s| s.id == station.id) else {
            bail!("no station {}", station.id);
        };
        existing.fields = *fields;
        state.writes.push(format!("update_station {}", station.id));
        Ok(())
    }

    async fn lookup_ship(&self, name: &str) -> Result<i64> {
        self.check_error()?;
        self.ships
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown ship '{name}'"))
    }

    async fn upsert_ship_vendor(&self, ship_id: i64, station_id: i64) -> Result<()> {
        self.check_error()?;
        let mut state = self.state.lock().unwrap();
        if !state.vendors.contains(&(ship_id, station_id)) {
            state.vendors.push((ship_id, station_id));
        }
        state.writes.push(format!("ship_vendor {ship_id}@{station_id}"));
        Ok(())
    }

    async fn station_prices(&self, station_id: i64) -> Result<HashMap<String, StoredPrice>> {
        self.check_error()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .prices
            .get(&station_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn import_market(&self, station_id: i64, lines: &[PriceLine]) -> Result<usize> {
        self.check_error()?;
        let mut state = self.state.lock().unwrap();
        state.markets.insert(station_id, lines.to_vec());
        state.writes.push(format!("import_market {station_id}"));
        Ok(lines.len())
    }

    async fn export_table(&self, table: &str) -> Result<()> {
        self.check_error()?;
        let mut state = self.state.lock().unwrap();
        state.exports.push(table.to_string());
        state.writes.push(format!("export {table}"));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<(&'static str, Value)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<(&'static str, Value)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent().into_iter().map(|(k, _)| k).collect()
    }

    fn record(&self, kind: &'static str, message: Value) -> Result<()> {
        if *self.fail.lock().unwrap() {
            bail!("upload refused");
        }
        self.sent.lock().unwrap().push((kind, message));
        Ok(())
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish_commodities(&self, message: &CommodityMessage) -> Result<()> {
        self.record("commodity", serde_json::to_value(message)?)
    }

    async fn publish_shipyard(&self, message: &ShipyardMessage) -> Result<()> {
        self.record("shipyard", serde_json::to_value(message)?)
    }

    async fn publish_outfitting(&self, message: &OutfittingMessage) -> Result<()> {
        self.record("outfitting", serde_json::to_value(message)?)
    }
}
