//! SQLite adapter for the local trading database.
//!
//! Talks to an existing trading-tool database (System, Station, Ship,
//! ShipVendor, Item, StationItem tables) and refreshes CSV snapshots of
//! changed tables in the export directory.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use csv::{QuoteStyle, WriterBuilder};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{LocalStore, SHIP_VENDOR_TABLE, STATION_TABLE};
use crate::pipeline::prices::{DEMAND_UNKNOWN, STOCK_UNAVAILABLE};
use crate::types::{Flag, PriceLine, StationFields, StationRecord, StoredPrice};

const STATION_COLUMNS: &str = "st.station_id, sy.name AS system_name, st.name, st.ls_from_star, \
     st.blackmarket, st.max_pad_size, st.market, st.shipyard, st.modified, st.outfitting, \
     st.rearm, st.refuel, st.repair";

const STATION_HEADER: [&str; 12] = [
    "unq:name@System.system_id",
    "unq:name",
    "ls_from_star",
    "blackmarket",
    "max_pad_size",
    "market",
    "shipyard",
    "modified",
    "outfitting",
    "rearm",
    "refuel",
    "repair",
];

const SHIP_VENDOR_HEADER: [&str; 4] = [
    "unq:name@Ship.ship_id",
    "unq:name@System.system_id",
    "unq:name@Station.station_id",
    "modified",
];

/// One `Station` row joined with its system name.
#[derive(Debug, FromRow)]
struct StationRow {
    station_id: i64,
    system_name: String,
    name: String,
    ls_from_star: Option<i64>,
    blackmarket: Option<String>,
    max_pad_size: Option<String>,
    market: Option<String>,
    shipyard: Option<String>,
    modified: Option<String>,
    outfitting: Option<String>,
    rearm: Option<String>,
    refuel: Option<String>,
    repair: Option<String>,
}

#[derive(Debug, FromRow)]
struct ShipVendorRow {
    ship_name: String,
    system_name: String,
    station_name: String,
    modified: Option<String>,
}

fn flag(value: &Option<String>) -> Flag {
    value.as_deref().unwrap_or_default().parse().unwrap_or_default()
}

impl From<StationRow> for StationRecord {
    fn from(row: StationRow) -> Self {
        StationRecord {
            id: row.station_id,
            fields: StationFields {
                ls_from_star: row.ls_from_star.unwrap_or(0),
                black_market: flag(&row.blackmarket),
                max_pad_size: row
                    .max_pad_size
                    .as_deref()
                    .unwrap_or_default()
                    .parse()
                    .unwrap_or_default(),
                market: flag(&row.market),
                shipyard: flag(&row.shipyard),
                outfitting: flag(&row.outfitting),
                rearm: flag(&row.rearm),
                refuel: flag(&row.refuel),
                repair: flag(&row.repair),
            },
            system: row.system_name,
            name: row.name,
        }
    }
}

impl StationRow {
    fn csv_record(&self) -> [String; 12] {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        [
            self.system_name.clone(),
            self.name.clone(),
            self.ls_from_star.unwrap_or(0).to_string(),
            text(&self.blackmarket),
            text(&self.max_pad_size),
            text(&self.market),
            text(&self.shipyard),
            text(&self.modified),
            text(&self.outfitting),
            text(&self.rearm),
            text(&self.refuel),
            text(&self.repair),
        ]
    }
}

/// Render a table in the trading tool's import format: comma separated,
/// every field in single quotes, embedded quotes doubled.
fn render_csv<R, F>(header: &[&str], records: R) -> Result<String>
where
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .quote(b'\'')
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to finish CSV export")?;
    String::from_utf8(bytes).context("CSV export is not valid UTF-8")
}

pub struct SqliteStore {
    pool: SqlitePool,
    export_dir: PathBuf,
}

impl SqliteStore {
    /// Open the trading database at `database_url` (e.g. `sqlite://data/TradeDangerous.db`).
    pub async fn connect(database_url: &str, export_dir: impl Into<PathBuf>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to open trading database {database_url}"))?;
        info!(database_url, "Trading database opened");
        Ok(Self::new(pool, export_dir))
    }

    pub fn new(pool: SqlitePool, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    async fn station_csv(&self) -> Result<String> {
        let sql = format!(
            "SELECT {STATION_COLUMNS} FROM Station st \
             JOIN System sy ON sy.system_id = st.system_id \
             ORDER BY sy.name, st.name"
        );
        let rows = sqlx::query_as::<_, StationRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to read Station table")?;

        render_csv(&STATION_HEADER, rows.iter().map(StationRow::csv_record))
    }

    async fn ship_vendor_csv(&self) -> Result<String> {
        let rows = sqlx::query_as::<_, ShipVendorRow>(
            "SELECT sh.name AS ship_name, sy.name AS system_name, st.name AS station_name, \
             sv.modified \
             FROM ShipVendor sv \
             JOIN Ship sh ON sh.ship_id = sv.ship_id \
             JOIN Station st ON st.station_id = sv.station_id \
             JOIN System sy ON sy.system_id = st.system_id \
             ORDER BY sy.name, st.name, sh.name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read ShipVendor table")?;

        render_csv(
            &SHIP_VENDOR_HEADER,
            rows.iter().map(|r| {
                [
                    r.ship_name.as_str(),
                    r.system_name.as_str(),
                    r.station_name.as_str(),
                    r.modified.as_deref().unwrap_or_default(),
                ]
            }),
        )
    }
}

/// Split a rendered stock/demand value (`"120M"`, `"-"`, `"?"`) into
/// units and level. Unknown is `-1`, as the trading tool stores it.
fn units_and_level(rendered: &str) -> (i64, i64) {
    if rendered == DEMAND_UNKNOWN {
        return (-1, -1);
    }
    if rendered == STOCK_UNAVAILABLE {
        return (0, 0);
    }
    let (digits, letter) = rendered.split_at(rendered.len().saturating_sub(1));
    let level = match letter {
        "L" => 1,
        "M" => 2,
        "H" => 3,
        _ => 0,
    };
    (digits.parse().unwrap_or(0), level)
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn lookup_station(&self, system: &str, name: &str) -> Result<Option<StationRecord>> {
        let sql = format!(
            "SELECT {STATION_COLUMNS} FROM Station st \
             JOIN System sy ON sy.system_id = st.system_id \
             WHERE sy.name = ? COLLATE NOCASE AND st.name = ? COLLATE NOCASE"
        );
        let row = sqlx::query_as::<_, StationRow>(&sql)
            .bind(system)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to look up station {system}/{name}"))?;

        Ok(row.map(StationRecord::from))
    }

    async fn add_station(
        &self,
        system: &str,
        name: &str,
        fields: &StationFields,
    ) -> Result<StationRecord> {
        let system_row = sqlx::query("SELECT system_id, name FROM System WHERE name = ? COLLATE NOCASE")
            .bind(system)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to look up system {system}"))?;
        let Some(system_row) = system_row else {
            bail!("System '{system}' is not in the trading database");
        };
        let system_id: i64 = system_row.try_get("system_id")?;
        let system_name: String = system_row.try_get("name")?;

        let result = sqlx::query(
            "INSERT INTO Station \
             (name, system_id, ls_from_star, blackmarket, max_pad_size, market, shipyard, \
              outfitting, rearm, refuel, repair, modified) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
        )
        .bind(name)
        .bind(system_id)
        .bind(fields.ls_from_star)
        .bind(fields.black_market.to_string())
        .bind(fields.max_pad_size.to_string())
        .bind(fields.market.to_string())
        .bind(fields.shipyard.to_string())
        .bind(fields.outfitting.to_string())
        .bind(fields.rearm.to_string())
        .bind(fields.refuel.to_string())
        .bind(fields.repair.to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to add station {system}/{name}"))?;

        let id = result.last_insert_rowid();
        info!(station_id = id, system = %system_name, station = name, "Station added");
        Ok(StationRecord {
            id,
            system: system_name,
            name: name.to_string(),
            fields: *fields,
        })
    }

    async fn update_station(&self, station: &StationRecord, fields: &StationFields) -> Result<()> {
        sqlx::query(
            "UPDATE Station SET ls_from_star = ?, blackmarket = ?, max_pad_size = ?, \
             market = ?, shipyard = ?, outfitting = ?, rearm = ?, refuel = ?, repair = ?, \
             modified = CURRENT_TIMESTAMP \
             WHERE station_id = ?",
        )
        .bind(fields.ls_from_star)
        .bind(fields.black_market.to_string())
        .bind(fields.max_pad_size.to_string())
        .bind(fields.market.to_string())
        .bind(fields.shipyard.to_string())
        .bind(fields.outfitting.to_string())
        .bind(fields.rearm.to_string())
        .bind(fields.refuel.to_string())
        .bind(fields.repair.to_string())
        .bind(station.id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to update station {}/{}", station.system, station.name))?;

        info!(station_id = station.id, "Station updated");
        Ok(())
    }

    async fn lookup_ship(&self, name: &str) -> Result<i64> {
        let row = sqlx::query("SELECT ship_id FROM Ship WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to look up ship {name}"))?;
        match row {
            Some(row) => Ok(row.try_get("ship_id")?),
            None => bail!("Ship '{name}' is not in the trading database"),
        }
    }

    async fn upsert_ship_vendor(&self, ship_id: i64, station_id: i64) -> Result<()> {
        sqlx::query(
            "REPLACE INTO ShipVendor (ship_id, station_id, modified) \
             VALUES (?, ?, CURRENT_TIMESTAMP)",
        )
        .bind(ship_id)
        .bind(station_id)
        .execute(&self.pool)
        .await
        .context("Failed to record ship vendor")?;
        Ok(())
    }

    async fn station_prices(&self, station_id: i64) -> Result<HashMap<String, StoredPrice>> {
        let rows = sqlx::query(
            "SELECT i.name, si.demand_price, si.supply_price \
             FROM StationItem si JOIN Item i ON i.item_id = si.item_id \
             WHERE si.station_id = ?",
        )
        .bind(station_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to read stored prices")?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("name")?,
                    StoredPrice {
                        sell_price: row.try_get("demand_price")?,
                        buy_price: row.try_get("supply_price")?,
                    },
                ))
            })
            .collect()
    }

    async fn import_market(&self, station_id: i64, lines: &[PriceLine]) -> Result<usize> {
        let mut tx = self.pool.begin().await.context("Failed to begin market import")?;

        sqlx::query("DELETE FROM StationItem WHERE station_id = ?")
            .bind(station_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear station market")?;

        let mut written = 0;
        for line in lines {
            let item = sqlx::query("SELECT item_id FROM Item WHERE name = ? COLLATE NOCASE")
                .bind(&line.name)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("Failed to look up item {}", line.name))?;
            let Some(item) = item else {
                warn!(item = %line.name, "Unknown item, skipped");
                continue;
            };
            let item_id: i64 = item.try_get("item_id")?;
            let (demand_units, demand_level) = units_and_level(&line.demand);
            let (supply_units, supply_level) = units_and_level(&line.stock);

            sqlx::query(
                "INSERT INTO StationItem \
                 (station_id, item_id, demand_price, demand_units, demand_level, \
                  supply_price, supply_units, supply_level, modified) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
            )
            .bind(station_id)
            .bind(item_id)
            .bind(line.sell_price)
            .bind(demand_units)
            .bind(demand_level)
            .bind(line.buy_price)
            .bind(supply_units)
            .bind(supply_level)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to write price for {}", line.name))?;
            written += 1;
        }

        tx.commit().await.context("Failed to commit market import")?;
        debug!(station_id, written, "Market imported");
        Ok(written)
    }

    async fn export_table(&self, table: &str) -> Result<()> {
        let csv = match table {
            STATION_TABLE => self.station_csv().await?,
            SHIP_VENDOR_TABLE => self.ship_vendor_csv().await?,
            other => bail!("No export defined for table {other}"),
        };

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.export_dir.display()))?;
        let path = self.export_dir.join(format!("{table}.csv"));
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), "Table exported");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
