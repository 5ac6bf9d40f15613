//! Shared types for EDAPI.
//!
//! These types form the data model used across the session, pipeline,
//! storage, and publish modules. They are designed to be stable so that
//! collaborators can depend on them without circular references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Tri-state presence flag as the trading database stores it (`Y`/`N`/`?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flag {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Flag {
    pub fn as_char(&self) -> char {
        match self {
            Flag::Yes => 'Y',
            Flag::No => 'N',
            Flag::Unknown => '?',
        }
    }

    /// Parse a single character, case-insensitively. Anything else is unknown.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'Y' => Flag::Yes,
            'N' => Flag::No,
            _ => Flag::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Flag::Unknown
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Flag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim().chars().next().map(Flag::from_char).unwrap_or_default())
    }
}

/// Largest landing pad a station offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PadSize {
    Small,
    Medium,
    Large,
    #[default]
    Unknown,
}

impl PadSize {
    pub fn as_char(&self) -> char {
        match self {
            PadSize::Small => 'S',
            PadSize::Medium => 'M',
            PadSize::Large => 'L',
            PadSize::Unknown => '?',
        }
    }

    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'S' => PadSize::Small,
            'M' => PadSize::Medium,
            'L' => PadSize::Large,
            _ => PadSize::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != PadSize::Unknown
    }
}

impl fmt::Display for PadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for PadSize {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.trim().chars().next().map(PadSize::from_char).unwrap_or_default())
    }
}

/// The reconciled field set of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StationFields {
    /// Distance from the arrival star in light-seconds. 0 means unknown.
    pub ls_from_star: i64,
    pub black_market: Flag,
    pub max_pad_size: PadSize,
    pub market: Flag,
    pub shipyard: Flag,
    pub outfitting: Flag,
    pub rearm: Flag,
    pub refuel: Flag,
    pub repair: Flag,
}

/// A station as held by the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: i64,
    pub system: String,
    pub name: String,
    pub fields: StationFields,
}

impl fmt::Display for StationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.fields;
        write!(
            f,
            "{}/{} (ls={} bm={} pad={} mkt={} shp={} out={} arm={} ref={} rep={})",
            self.system,
            self.name,
            s.ls_from_star,
            s.black_market,
            s.max_pad_size,
            s.market,
            s.shipyard,
            s.outfitting,
            s.rearm,
            s.refuel,
            s.repair,
        )
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A marketable commodity that survived filtering.
///
/// `name` and `category` are already passed through the correction tables;
/// `service_name` keeps the spelling the companion service used, which is
/// what the event network expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityRecord {
    pub name: String,
    pub service_name: String,
    pub category: String,
    pub mean_price: i64,
    pub buy_price: i64,
    pub sell_price: i64,
    pub stock: i64,
    pub stock_bracket: u8,
    pub demand: i64,
    pub demand_bracket: u8,
    pub status_flags: Vec<String>,
}

/// Share of a station economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyRecord {
    pub name: String,
    pub proportion: f64,
}

/// One row of the local import format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLine {
    pub name: String,
    pub category: String,
    /// Price the station pays; forced to 0 when there is no demand.
    pub sell_price: i64,
    pub buy_price: i64,
    /// Rendered demand, e.g. `"5L"` or `"?"`.
    pub demand: String,
    /// Rendered stock, e.g. `"120M"` or `"-"`.
    pub stock: String,
}

/// Prices currently held by the store for one item at one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredPrice {
    pub sell_price: i64,
    pub buy_price: i64,
}

/// Display-only change between stored and freshly imported prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDelta {
    pub name: String,
    pub old_sell: i64,
    pub new_sell: i64,
    pub old_buy: i64,
    pub new_buy: i64,
}

impl PriceDelta {
    pub fn sell_change(&self) -> i64 {
        self.new_sell - self.old_sell
    }

    pub fn buy_change(&self) -> i64 {
        self.new_buy - self.old_buy
    }

    pub fn is_unchanged(&self) -> bool {
        self.sell_change() == 0 && self.buy_change() == 0
    }
}

impl fmt::Display for PriceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} sell {:>7} ({:+}) buy {:>7} ({:+})",
            self.name,
            self.new_sell,
            self.sell_change(),
            self.new_buy,
            self.buy_change(),
        )
    }
}

// ---------------------------------------------------------------------------
// Shipyard and outfitting
// ---------------------------------------------------------------------------

/// The three names of one ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipIdentity {
    /// Identifier used by the companion service, e.g. `"CobraMkIII"`.
    pub service_id: String,
    /// Name in the local trading tool, e.g. `"Cobra"`.
    pub local_name: String,
    /// Name on the event network, e.g. `"Cobra MkIII"`.
    pub network_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    Standard,
    Hardpoint,
    Internal,
    Utility,
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleCategory::Standard => "standard",
            ModuleCategory::Hardpoint => "hardpoint",
            ModuleCategory::Internal => "internal",
            ModuleCategory::Utility => "utility",
        };
        write!(f, "{s}")
    }
}

/// Outfitting module descriptor from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    #[serde(skip)]
    pub id: u64,
    pub category: ModuleCategory,
    pub name: String,
    pub class: String,
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship: Option<String>,
}

/// A module offered by the station, with its catalog descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfittingEntry {
    /// Name as the companion service reported it, e.g. `"Hpt_PulseLaser_Fixed_Small"`.
    pub service_name: String,
    pub module: ModuleRecord,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for EDAPI.
///
/// Every variant is fatal for the current run.
#[derive(Debug, thiserror::Error)]
pub enum EdapiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unable to parse profile: {0}")]
    ProfileParse(String),

    #[error("Unknown {kind} '{id}': the companion service reported an item this tool does not know about")]
    Mapping { kind: &'static str, id: String },

    #[error("Local store error: {0}")]
    Store(String),

    #[error("Companion request failed: {0}")]
    Transport(String),

    #[error("Cookie store error: {0}")]
    CookieStore(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Publish failed ({kind}): {message}")]
    Publish { kind: &'static str, message: String },
}

impl EdapiError {
    pub fn unknown_ship(id: impl Into<String>) -> Self {
        EdapiError::Mapping {
            kind: "ship",
            id: id.into(),
        }
    }

    pub fn unknown_module(id: impl Into<String>) -> Self {
        EdapiError::Mapping {
            kind: "module",
            id: id.into(),
        }
    }

    /// Wrap a store collaborator failure, keeping the whole context chain.
    pub fn store(err: anyhow::Error) -> Self {
        EdapiError::Store(format!("{err:#}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
