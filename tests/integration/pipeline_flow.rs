//! End-to-end pipeline runs against the in-memory store and publisher.

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};

use edapi::pipeline::station::StationChange;
use edapi::pipeline::{Pipeline, RunOutcome};
use edapi::profile::Profile;
use edapi::prompt::ScriptedPrompt;
use edapi::types::{EdapiError, Flag, PadSize};

use crate::mock_store::{MockStore, RecordingPublisher};

const STATION_ID: i64 = 10;

fn fixture() -> Profile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/profile.json");
    Profile::from_file(&path).unwrap()
}

fn fixture_with(edit: impl FnOnce(&mut serde_json::Value)) -> Profile {
    let mut raw = fixture().raw().clone();
    edit(&mut raw);
    Profile::from_value(raw).unwrap()
}

fn temp_path(ext: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("edapi_flow_{}.{ext}", uuid::Uuid::new_v4()));
    p
}

fn known_store() -> MockStore {
    MockStore::with_station("ERANIN", "Azeban City", STATION_ID)
}

fn no_answers() -> ScriptedPrompt {
    ScriptedPrompt::new(Vec::<String>::new())
}

#[tokio::test]
async fn test_not_docked_touches_nothing() {
    let profile = fixture_with(|raw| raw["commander"]["docked"] = json!(false));
    let store = known_store();
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    let outcome = Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NotDocked);
    assert!(store.writes().is_empty());
    assert!(publisher.sent().is_empty());
    assert!(prompt.asked().is_empty());
}

#[tokio::test]
async fn test_full_run_imports_and_publishes() {
    let profile = fixture();
    let store = known_store();
    store.set_price(STATION_ID, "Gold", 5000, 0);
    store.set_price(STATION_ID, "Agri-Medicines", 1150, 0);
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();
    let prices_path = temp_path("prices");
    let at = Utc.with_ymd_and_hms(2016, 5, 1, 12, 30, 0).unwrap();

    let outcome = Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .with_prices_file(&prices_path)
        .run_at(&profile, at)
        .await
        .unwrap();

    let RunOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert_eq!(report.station_change, Some(StationChange::Unchanged));
    assert!(prompt.asked().is_empty());

    // Ship vendors: shipyard list in service order, then unavailable list
    assert_eq!(report.ship_vendors, 3);
    assert_eq!(store.vendors(), vec![(1, STATION_ID), (3, STATION_ID), (2, STATION_ID)]);
    assert_eq!(store.exports(), vec!["ShipVendor"]);

    // Market import: display values
    let market = store.market(STATION_ID);
    let rows: Vec<(&str, i64, i64, &str, &str)> = market
        .iter()
        .map(|l| {
            (
                l.name.as_str(),
                l.sell_price,
                l.buy_price,
                l.demand.as_str(),
                l.stock.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Gold", 0, 0, "?", "120M"),
            ("Agri-Medicines", 1150, 0, "5L", "-"),
            ("Beer", 0, 120, "?", "4000H"),
        ]
    );
    assert_eq!(report.imported, 3);

    // Deltas only for items the store already priced
    assert_eq!(report.deltas.len(), 2);
    let gold = report.deltas.iter().find(|d| d.name == "Gold").unwrap();
    assert_eq!((gold.old_sell, gold.new_sell), (5000, 0));
    assert!(report
        .deltas
        .iter()
        .find(|d| d.name == "Agri-Medicines")
        .unwrap()
        .is_unchanged());

    // .prices file
    let text = std::fs::read_to_string(&prices_path).unwrap();
    assert_eq!(
        text,
        "@ Eranin/Azeban City\n\
         \t+ Metals\n\
         \t\tGold 0 0 ? 120M\n\
         \t+ Medicines\n\
         \t\tAgri-Medicines 1150 0 5L -\n\
         \t+ Foods\n\
         \t\tBeer 0 120 ? 4000H\n"
    );
    std::fs::remove_file(&prices_path).unwrap();

    // Publish: raw prices, service names, sorted network ship names
    assert_eq!(publisher.kinds(), vec!["commodity", "shipyard", "outfitting"]);
    assert_eq!(report.published, vec!["commodity", "shipyard", "outfitting"]);
    let sent = publisher.sent();

    let commodity = &sent[0].1;
    assert_eq!(commodity["timestamp"], "2016-05-01T12:30:00Z");
    assert_eq!(commodity["commodities"].as_array().unwrap().len(), 3);
    assert_eq!(commodity["commodities"][0]["name"], "Gold");
    assert_eq!(commodity["commodities"][0]["sellPrice"], 5101);
    assert_eq!(commodity["commodities"][0]["buyPrice"], 0);
    assert_eq!(commodity["commodities"][0]["stockBracket"], 2);
    assert_eq!(commodity["commodities"][1]["name"], "Agricultural Medicines");
    assert_eq!(commodity["economies"][1]["proportion"], 0.2);
    assert_eq!(commodity["economies"][0]["name"], "Industrial");
    assert_eq!(commodity["prohibited"], json!(["Battle Weapons", "Slaves"]));

    let shipyard = &sent[1].1;
    assert_eq!(shipyard["ships"], json!(["Adder", "Cobra MkIII", "Sidewinder"]));

    let outfitting = &sent[2].1;
    let names: Vec<&str> = outfitting["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Pulse Laser", "Cargo Rack", "Lightweight Alloy"]);
}

#[tokio::test]
async fn test_unknown_ship_aborts_before_writes() {
    let profile = fixture_with(|raw| {
        raw["lastStarport"]["ships"]["unavailable_list"] = json!([{ "id": 1, "name": "Mamba" }]);
    });
    let store = known_store();
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    let err = Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap_err();

    assert!(matches!(err, EdapiError::Mapping { kind: "ship", ref id } if id == "Mamba"));
    assert!(store.writes().is_empty());
    assert!(publisher.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_module_aborts_before_writes() {
    let profile = fixture_with(|raw| {
        raw["lastStarport"]["modules"]["1"] = json!({ "id": 1, "name": "Hpt_Prototype_Fixed_Huge" });
    });
    let store = known_store();
    let prompt = no_answers();

    let err = Pipeline::new(&prompt)
        .with_store(&store)
        .run(&profile)
        .await
        .unwrap_err();

    assert!(matches!(err, EdapiError::Mapping { kind: "module", .. }));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_missing_market_halts_after_shipyard() {
    let profile = fixture_with(|raw| {
        raw["lastStarport"]
            .as_object_mut()
            .unwrap()
            .remove("commodities");
    });
    let store = known_store();
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    let outcome = Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap();

    let RunOutcome::NoMarket(report) = outcome else {
        panic!("expected the run to stop without a market, got {outcome:?}");
    };
    assert_eq!(report.ship_vendors, 3);
    assert!(store.market(STATION_ID).is_empty());
    assert!(!store.writes().iter().any(|w| w.starts_with("import_market")));
    assert!(publisher.sent().is_empty());
    assert_eq!(prompt.notices().len(), 1);
}

#[tokio::test]
async fn test_new_station_is_added_with_prompts() {
    let profile = fixture();
    let store = MockStore::new();
    let prompt = ScriptedPrompt::new(["1100", "N", "L", "Y", "Y", "Y", "Y"]);

    let outcome = Pipeline::new(&prompt)
        .with_store(&store)
        .run(&profile)
        .await
        .unwrap();

    let RunOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert_eq!(report.station_change, Some(StationChange::Added));
    assert_eq!(prompt.remaining(), 0);

    let stations = store.stations();
    assert_eq!(stations.len(), 1);
    let fields = stations[0].fields;
    assert_eq!(fields.ls_from_star, 1100);
    assert_eq!(fields.black_market, Flag::No);
    assert_eq!(fields.max_pad_size, PadSize::Large);
    assert_eq!(fields.market, Flag::Yes);
    assert_eq!(fields.shipyard, Flag::Yes);

    assert_eq!(store.exports(), vec!["Station", "ShipVendor"]);
    assert_eq!(store.market(stations[0].id).len(), 3);
}

#[tokio::test]
async fn test_store_failure_is_fatal() {
    let profile = fixture();
    let store = known_store();
    store.set_error("disk I/O error");
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    let err = Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap_err();

    assert!(matches!(err, EdapiError::Store(ref m) if m.contains("disk I/O error")));
    assert!(publisher.sent().is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_reported() {
    let profile = fixture();
    let publisher = RecordingPublisher::new();
    publisher.set_failing();
    let prompt = no_answers();

    let err = Pipeline::new(&prompt)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap_err();

    assert!(matches!(err, EdapiError::Publish { kind: "commodity", .. }));
}

#[tokio::test]
async fn test_publish_only_without_store() {
    let profile = fixture();
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    let outcome = Pipeline::new(&prompt)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap();

    let RunOutcome::Completed(report) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert!(report.station_change.is_none());
    assert_eq!(report.imported, 0);
    assert_eq!(publisher.kinds(), vec!["commodity", "shipyard", "outfitting"]);
}

#[tokio::test]
async fn test_empty_shipyard_is_not_published() {
    let profile = fixture_with(|raw| {
        raw["lastStarport"]["ships"] = json!({ "shipyard_list": {}, "unavailable_list": [] });
        raw["lastStarport"]
            .as_object_mut()
            .unwrap()
            .remove("modules");
    });
    let store = known_store();
    let publisher = RecordingPublisher::new();
    let prompt = no_answers();

    Pipeline::new(&prompt)
        .with_store(&store)
        .with_publisher(&publisher)
        .run(&profile)
        .await
        .unwrap();

    assert_eq!(publisher.kinds(), vec!["commodity"]);
    // the vendor table is still refreshed
    assert_eq!(store.exports(), vec!["ShipVendor"]);
}
