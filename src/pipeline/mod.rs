//! Normalization and reconciliation pipeline.
//!
//! One run takes a profile snapshot and:
//!
//! 1. stops at once if the commander is not docked;
//! 2. normalizes market, economies, shipyard and outfitting, resolving
//!    every ship and module id before anything is written;
//! 3. reconciles the station and its ship vendors with the local store;
//! 4. imports the market (and optionally writes a `.prices` file);
//! 5. publishes whatever payloads are non-empty.
//!
//! A missing market halts the run after step 3.

pub mod coerce;
pub mod commodities;
pub mod outfitting;
pub mod prices;
pub mod ships;
pub mod station;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use self::station::{reconcile_station, Observed, StationChange};
use crate::profile::Profile;
use crate::prompt::PromptProvider;
use crate::publish::{self, Publisher};
use crate::storage::{LocalStore, SHIP_VENDOR_TABLE};
use crate::types::{
    CommodityRecord, EconomyRecord, EdapiError, OutfittingEntry, PriceDelta, ShipIdentity,
};

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Everything derived from one snapshot, before any side effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub system: String,
    pub station: String,
    /// `None` when the snapshot carries no market section.
    pub commodities: Option<Vec<CommodityRecord>>,
    pub economies: Vec<EconomyRecord>,
    pub prohibited: Vec<String>,
    /// `None` when the station has no shipyard.
    pub ships: Option<Vec<ShipIdentity>>,
    pub modules: Vec<OutfittingEntry>,
}

impl Normalized {
    pub fn observed(&self) -> Observed {
        Observed {
            has_market: self.commodities.is_some(),
            has_shipyard: self.ships.is_some(),
        }
    }
}

/// Normalize a snapshot. Unknown ships or modules fail the whole thing.
pub fn normalize(profile: &Profile) -> Result<Normalized, EdapiError> {
    let system = profile.system_name()?.to_string();
    let station = profile.station_name()?.to_string();

    let market = profile
        .starport_section("commodities")
        .map(commodities::normalize_commodities);
    let economies = commodities::normalize_economies(profile.starport_section("economies"));
    let prohibited = commodities::prohibited(profile.starport_section("prohibited"));
    let shipyard = profile
        .starport_section("ships")
        .map(ships::normalize_ships)
        .transpose()?;
    let modules = match profile.starport_section("modules") {
        Some(section) => outfitting::normalize_modules(section)?,
        None => Vec::new(),
    };

    debug!(
        system = %system,
        station = %station,
        commodities = market.as_ref().map_or(0, Vec::len),
        ships = shipyard.as_ref().map_or(0, Vec::len),
        modules = modules.len(),
        "Snapshot normalized"
    );

    Ok(Normalized {
        system,
        station,
        commodities: market,
        economies,
        prohibited,
        ships: shipyard,
        modules,
    })
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub system: String,
    pub station: String,
    pub station_change: Option<StationChange>,
    /// Ship vendor rows written.
    pub ship_vendors: usize,
    /// Market lines the store accepted.
    pub imported: usize,
    pub deltas: Vec<PriceDelta>,
    pub prices_file: Option<PathBuf>,
    /// Payload kinds handed to the publisher, in order.
    pub published: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Commander not docked; nothing was written or published.
    NotDocked,
    /// No market in the snapshot; station and shipyard were reconciled,
    /// nothing imported or published.
    NoMarket(RunReport),
    Completed(RunReport),
}

/// One reconciliation run, wired to optional collaborators.
pub struct Pipeline<'a> {
    prompt: &'a dyn PromptProvider,
    store: Option<&'a dyn LocalStore>,
    publisher: Option<&'a dyn Publisher>,
    prices_file: Option<PathBuf>,
}

impl<'a> Pipeline<'a> {
    pub fn new(prompt: &'a dyn PromptProvider) -> Self {
        Self {
            prompt,
            store: None,
            publisher: None,
            prices_file: None,
        }
    }

    pub fn with_store(mut self, store: &'a dyn LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_publisher(mut self, publisher: &'a dyn Publisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_prices_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.prices_file = Some(path.into());
        self
    }

    pub async fn run(&self, profile: &Profile) -> Result<RunOutcome, EdapiError> {
        self.run_at(profile, Utc::now()).await
    }

    /// Run with an explicit publish timestamp.
    pub async fn run_at(
        &self,
        profile: &Profile,
        at: DateTime<Utc>,
    ) -> Result<RunOutcome, EdapiError> {
        if !profile.is_docked() {
            warn!("Commander not docked, nothing to do");
            return Ok(RunOutcome::NotDocked);
        }

        let normalized = normalize(profile)?;
        let mut report = RunReport {
            system: normalized.system.clone(),
            station: normalized.station.clone(),
            ..RunReport::default()
        };

        // -- Local store: station and shipyard ---------------------------

        let mut station_id = None;
        if let Some(store) = self.store {
            let (change, record) = reconcile_station(
                store,
                self.prompt,
                &normalized.system,
                &normalized.station,
                normalized.observed(),
            )
            .await?;
            report.station_change = Some(change);
            station_id = Some(record.id);

            if let Some(ships) = &normalized.ships {
                report.ship_vendors = self.update_ship_vendors(store, record.id, ships).await?;
            }
        }

        let Some(commodities) = &normalized.commodities else {
            self.prompt.notify(
                "The companion service did not return a market for this station. \
                 It occasionally skips it; try again.",
            );
            return Ok(RunOutcome::NoMarket(report));
        };

        // -- Local store: market -----------------------------------------

        let lines = prices::price_lines(commodities);

        if let (Some(store), Some(id)) = (self.store, station_id) {
            let previous = store.station_prices(id).await.map_err(EdapiError::store)?;
            report.imported = store
                .import_market(id, &lines)
                .await
                .map_err(EdapiError::store)?;
            report.deltas = prices::price_deltas(&previous, &lines);
            info!(
                station = %normalized.station,
                imported = report.imported,
                changed = report.deltas.iter().filter(|d| !d.is_unchanged()).count(),
                "Market imported"
            );
        }

        if let Some(path) = &self.prices_file {
            let text = prices::prices_file(&normalized.system, &normalized.station, &lines);
            tokio::fs::write(path, text).await.map_err(|e| {
                EdapiError::Store(format!("failed to write {}: {e}", path.display()))
            })?;
            info!(path = %path.display(), lines = lines.len(), "Prices file written");
            report.prices_file = Some(path.clone());
        }

        // -- Publish -----------------------------------------------------

        if let Some(publisher) = self.publisher {
            report.published = self.publish(publisher, &normalized, commodities, at).await?;
        }

        Ok(RunOutcome::Completed(report))
    }

    async fn update_ship_vendors(
        &self,
        store: &dyn LocalStore,
        station_id: i64,
        ships: &[ShipIdentity],
    ) -> Result<usize, EdapiError> {
        for ship in ships {
            let ship_id = store
                .lookup_ship(&ship.local_name)
                .await
                .map_err(EdapiError::store)?;
            store
                .upsert_ship_vendor(ship_id, station_id)
                .await
                .map_err(EdapiError::store)?;
        }
        store
            .export_table(SHIP_VENDOR_TABLE)
            .await
            .map_err(EdapiError::store)?;

        info!(station_id, ships = ships.len(), "Ship vendors updated");
        Ok(ships.len())
    }

    async fn publish(
        &self,
        publisher: &dyn Publisher,
        normalized: &Normalized,
        commodities: &[CommodityRecord],
        at: DateTime<Utc>,
    ) -> Result<Vec<&'static str>, EdapiError> {
        let system = normalized.system.as_str();
        let station = normalized.station.as_str();
        let mut published = Vec::new();

        if !commodities.is_empty() {
            let message = publish::commodity_message(
                system,
                station,
                at,
                commodities,
                &normalized.economies,
                &normalized.prohibited,
            );
            publisher
                .publish_commodities(&message)
                .await
                .map_err(|e| publish_error("commodity", e))?;
            published.push("commodity");
        }

        if let Some(yard) = normalized.ships.as_deref().filter(|s| !s.is_empty()) {
            let message = publish::shipyard_message(system, station, at, ships::network_names(yard));
            publisher
                .publish_shipyard(&message)
                .await
                .map_err(|e| publish_error("shipyard", e))?;
            published.push("shipyard");
        }

        if !normalized.modules.is_empty() {
            let message = publish::outfitting_message(system, station, at, &normalized.modules);
            publisher
                .publish_outfitting(&message)
                .await
                .map_err(|e| publish_error("outfitting", e))?;
            published.push("outfitting");
        }

        Ok(published)
    }
}

fn publish_error(kind: &'static str, err: anyhow::Error) -> EdapiError {
    EdapiError::Publish {
        kind,
        message: format!("{err:#}"),
    }
}
