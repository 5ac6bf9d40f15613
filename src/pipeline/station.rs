//! Station reconciliation against the local store.
//!
//! A market or shipyard section in the snapshot marks that service as
//! present. Any field the snapshot cannot settle is asked for, but only
//! while its value is still unknown.

use tracing::info;

use crate::prompt::PromptProvider;
use crate::storage::{LocalStore, STATION_TABLE};
use crate::types::{EdapiError, Flag, PadSize, StationFields, StationRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationChange {
    Added,
    Updated,
    Unchanged,
}

/// What the snapshot itself says about the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observed {
    pub has_market: bool,
    pub has_shipyard: bool,
}

const FLAG_CHOICES: [char; 3] = ['Y', 'N', '?'];
const PAD_CHOICES: [char; 4] = ['S', 'M', 'L', '?'];

fn prompt_error(err: anyhow::Error) -> EdapiError {
    EdapiError::Prompt(format!("{err:#}"))
}

fn ask_distance(prompt: &dyn PromptProvider, question: &str) -> Result<i64, EdapiError> {
    let answer = prompt.ask_text(question, Some("0")).map_err(prompt_error)?;
    answer
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|ls| ls.is_finite() && *ls >= 0.0)
        .map(|ls| (ls + 0.5).trunc() as i64)
        .ok_or_else(|| EdapiError::Prompt(format!("'{answer}' is not a distance in light-seconds")))
}

fn ask_flag(prompt: &dyn PromptProvider, question: &str, current: Flag) -> Result<Flag, EdapiError> {
    let c = prompt
        .ask_choice(question, &FLAG_CHOICES, current.as_char())
        .map_err(prompt_error)?;
    Ok(Flag::from_char(c))
}

fn ask_pad(prompt: &dyn PromptProvider, question: &str, current: PadSize) -> Result<PadSize, EdapiError> {
    let c = prompt
        .ask_choice(question, &PAD_CHOICES, current.as_char())
        .map_err(prompt_error)?;
    Ok(PadSize::from_char(c))
}

/// Fill every field that is still unknown by asking. Known values are kept.
fn complete_fields(
    prompt: &dyn PromptProvider,
    mut fields: StationFields,
    prefix: &str,
) -> Result<StationFields, EdapiError> {
    if fields.ls_from_star <= 0 {
        fields.ls_from_star = ask_distance(prompt, &format!("{prefix}distance from star"))?;
    }
    if !fields.black_market.is_known() {
        fields.black_market =
            ask_flag(prompt, &format!("{prefix}black market present"), fields.black_market)?;
    }
    if !fields.max_pad_size.is_known() {
        fields.max_pad_size = ask_pad(prompt, &format!("{prefix}max pad size"), fields.max_pad_size)?;
    }
    for (label, flag) in [
        ("market", &mut fields.market),
        ("shipyard", &mut fields.shipyard),
        ("outfitting", &mut fields.outfitting),
        ("rearm", &mut fields.rearm),
        ("refuel", &mut fields.refuel),
        ("repair", &mut fields.repair),
    ] {
        if !flag.is_known() {
            *flag = ask_flag(prompt, &format!("{prefix}{label} present"), *flag)?;
        }
    }
    Ok(fields)
}

fn apply_observed(mut fields: StationFields, observed: Observed) -> StationFields {
    if observed.has_market {
        fields.market = Flag::Yes;
    }
    if observed.has_shipyard {
        fields.shipyard = Flag::Yes;
    }
    fields
}

/// Find the station in the store, adding or updating it as needed.
pub async fn reconcile_station(
    store: &dyn LocalStore,
    prompt: &dyn PromptProvider,
    system: &str,
    station: &str,
    observed: Observed,
) -> Result<(StationChange, StationRecord), EdapiError> {
    let existing = store
        .lookup_station(system, station)
        .await
        .map_err(EdapiError::store)?;

    match existing {
        None => {
            prompt.notify(&format!("Station unknown. Adding: {system}/{station}"));
            let fields = apply_observed(StationFields::default(), observed);
            let fields = complete_fields(prompt, fields, "")?;

            let record = store
                .add_station(system, station, &fields)
                .await
                .map_err(EdapiError::store)?;
            store.export_table(STATION_TABLE).await.map_err(EdapiError::store)?;

            info!(station = %record, "Station added");
            Ok((StationChange::Added, record))
        }
        Some(record) => {
            let fields = apply_observed(record.fields, observed);
            let fields = complete_fields(prompt, fields, "Update ")?;

            if fields == record.fields {
                return Ok((StationChange::Unchanged, record));
            }

            store
                .update_station(&record, &fields)
                .await
                .map_err(EdapiError::store)?;
            store.export_table(STATION_TABLE).await.map_err(EdapiError::store)?;

            let updated = StationRecord { fields, ..record };
            info!(station = %updated, "Station updated");
            Ok((StationChange::Updated, updated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::storage::MockLocalStore;

    fn known_fields() -> StationFields {
        StationFields {
            ls_from_star: 1100,
            black_market: Flag::No,
            max_pad_size: PadSize::Large,
            market: Flag::Yes,
            shipyard: Flag::Yes,
            outfitting: Flag::Yes,
            rearm: Flag::Yes,
            refuel: Flag::Yes,
            repair: Flag::Yes,
        }
    }

    fn record(fields: StationFields) -> StationRecord {
        StationRecord {
            id: 10,
            system: "Eranin".into(),
            name: "Azeban City".into(),
            fields,
        }
    }

    #[tokio::test]
    async fn test_new_station_prompts_and_inserts() {
        let mut store = MockLocalStore::new();
        store.expect_lookup_station().times(1).returning(|_, _| Ok(None));
        store
            .expect_add_station()
            .withf(|system, name, fields| {
                system == "Eranin"
                    && name == "Azeban City"
                    && fields.ls_from_star == 1100
                    && fields.black_market == Flag::No
                    && fields.max_pad_size == PadSize::Large
                    && fields.market == Flag::Yes
                    && fields.shipyard == Flag::Unknown
                    && fields.outfitting == Flag::Unknown
                    && fields.repair == Flag::Yes
            })
            .times(1)
            .returning(|system, name, fields| {
                Ok(StationRecord {
                    id: 77,
                    system: system.to_string(),
                    name: name.to_string(),
                    fields: *fields,
                })
            });
        store
            .expect_export_table()
            .withf(|table| table == STATION_TABLE)
            .times(1)
            .returning(|_| Ok(()));

        let prompt = ScriptedPrompt::new(["1100", "n", "L", "", "", "y", "y", "y"]);
        let observed = Observed {
            has_market: true,
            has_shipyard: false,
        };
        let (change, rec) = reconcile_station(&store, &prompt, "Eranin", "Azeban City", observed)
            .await
            .unwrap();

        assert_eq!(change, StationChange::Added);
        assert_eq!(rec.id, 77);
        assert_eq!(prompt.remaining(), 0);
        assert_eq!(prompt.asked().len(), 8);
    }

    #[tokio::test]
    async fn test_new_station_without_shipyard_asks_for_it() {
        let mut store = MockLocalStore::new();
        store.expect_lookup_station().returning(|_, _| Ok(None));
        store
            .expect_add_station()
            .withf(|_, _, fields| fields.market == Flag::Yes && fields.shipyard == Flag::No)
            .times(1)
            .returning(|system, name, fields| {
                Ok(StationRecord {
                    id: 78,
                    system: system.to_string(),
                    name: name.to_string(),
                    fields: *fields,
                })
            });
        store.expect_export_table().returning(|_| Ok(()));

        let prompt = ScriptedPrompt::new(["250", "n", "M", "n", "y", "y", "y", "y"]);
        let observed = Observed {
            has_market: true,
            has_shipyard: false,
        };
        let (change, rec) = reconcile_station(&store, &prompt, "Eranin", "Azeban City", observed)
            .await
            .unwrap();

        assert_eq!(change, StationChange::Added);
        assert_eq!(rec.fields.shipyard, Flag::No);
        let asked = prompt.asked();
        assert!(asked.iter().any(|q| q == "shipyard present"));
        assert!(!asked.iter().any(|q| q == "market present"));
    }

    #[tokio::test]
    async fn test_known_station_asks_for_unknown_market() {
        let mut stored = known_fields();
        stored.market = Flag::Unknown;

        let mut store = MockLocalStore::new();
        store
            .expect_lookup_station()
            .returning(move |_, _| Ok(Some(record(stored))));
        store
            .expect_update_station()
            .withf(|_, fields| fields.market == Flag::No)
            .times(1)
            .returning(|_, _| Ok(()));
        store.expect_export_table().times(1).returning(|_| Ok(()));

        let prompt = ScriptedPrompt::new(["n"]);
        let observed = Observed {
            has_market: false,
            has_shipyard: true,
        };
        let (change, _) = reconcile_station(&store, &prompt, "Eranin", "Azeban City", observed)
            .await
            .unwrap();

        assert_eq!(change, StationChange::Updated);
        assert_eq!(prompt.asked(), vec!["Update market present"]);
    }

    #[tokio::test]
    async fn test_known_station_unchanged_asks_nothing() {
        let mut store = MockLocalStore::new();
        store
            .expect_lookup_station()
            .returning(|_, _| Ok(Some(record(known_fields()))));
        store.expect_update_station().never();
        store.expect_export_table().never();

        let prompt = ScriptedPrompt::new(Vec::<String>::new());
        let observed = Observed {
            has_market: true,
            has_shipyard: true,
        };
        let (change, _) = reconcile_station(&store, &prompt, "Eranin", "Azeban City", observed)
            .await
            .unwrap();

        assert_eq!(change, StationChange::Unchanged);
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_known_station_fills_unknowns() {
        let mut stored = known_fields();
        stored.max_pad_size = PadSize::Unknown;
        stored.shipyard = Flag::Unknown;

        let mut store = MockLocalStore::new();
        store
            .expect_lookup_station()
            .returning(move |_, _| Ok(Some(record(stored))));
        store
            .expect_update_station()
            .withf(|station, fields| {
                station.id == 10
                    && fields.max_pad_size == PadSize::Medium
                    && fields.shipyard == Flag::Yes
                    && fields.ls_from_star == 1100
            })
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_export_table()
            .withf(|table| table == STATION_TABLE)
            .times(1)
            .returning(|_| Ok(()));

        let prompt = ScriptedPrompt::new(["m"]);
        let observed = Observed {
            has_market: true,
            has_shipyard: true,
        };
        let (change, rec) = reconcile_station(&store, &prompt, "Eranin", "Azeban City", observed)
            .await
            .unwrap();

        assert_eq!(change, StationChange::Updated);
        assert_eq!(rec.fields.max_pad_size, PadSize::Medium);
        assert_eq!(prompt.asked(), vec!["Update max pad size"]);
    }

    #[tokio::test]
    async fn test_unknown_answer_keeps_station_unchanged() {
        let mut stored = known_fields();
        stored.black_market = Flag::Unknown;

        let mut store = MockLocalStore::new();
        store
            .expect_lookup_station()
            .returning(move |_, _| Ok(Some(record(stored))));
        store.expect_update_station().never();
        store.expect_export_table().never();

        let prompt = ScriptedPrompt::new([""]);
        let (change, _) = reconcile_station(
            &store,
            &prompt,
            "Eranin",
            "Azeban City",
            Observed::default(),
        )
        .await
        .unwrap();
        assert_eq!(change, StationChange::Unchanged);
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let mut store = MockLocalStore::new();
        store
            .expect_lookup_station()
            .returning(|_, _| Err(anyhow::anyhow!("database is locked")));

        let prompt = ScriptedPrompt::new(Vec::<String>::new());
        let err = reconcile_station(&store, &prompt, "Eranin", "Azeban City", Observed::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EdapiError::Store(ref m) if m.contains("locked")));
    }

    #[tokio::test]
    async fn test_bad_distance_is_prompt_error() {
        let mut store = MockLocalStore::new();
        store.expect_lookup_station().returning(|_, _| Ok(None));
        store.expect_add_station().never();

        let prompt = ScriptedPrompt::new(["far"]);
        let err = reconcile_station(&store, &prompt, "Eranin", "Azeban City", Observed::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EdapiError::Prompt(_)));
    }
}
