//! Shipyard cross-mapping.

use serde_json::Value;

use crate::tables::{local_ship_name, network_ship_name};
use crate::types::{EdapiError, ShipIdentity};

/// Resolve a service ship id through both name tables.
///
/// An id missing from either table means the service added a ship this
/// tool has never seen; there is no sensible default.
pub fn resolve_ship(service_id: &str) -> Result<ShipIdentity, EdapiError> {
    let local = local_ship_name(service_id).ok_or_else(|| EdapiError::unknown_ship(service_id))?;
    let network =
        network_ship_name(service_id).ok_or_else(|| EdapiError::unknown_ship(service_id))?;
    Ok(ShipIdentity {
        service_id: service_id.to_string(),
        local_name: local.to_string(),
        network_name: network.to_string(),
    })
}

/// Ship ids listed in a shipyard section: purchasable ships (in key
/// order) followed by unavailable ones, duplicates kept.
pub fn shipyard_ids(section: &Value) -> Vec<String> {
    let mut ids = Vec::new();

    if let Some(list) = section["shipyard_list"].as_object() {
        for (key, ship) in list {
            let id = ship["name"].as_str().unwrap_or(key);
            ids.push(id.to_string());
        }
    }

    if let Some(list) = section["unavailable_list"].as_array() {
        ids.extend(
            list.iter()
                .filter_map(|ship| ship["name"].as_str())
                .map(str::to_string),
        );
    }

    ids
}

/// Resolve every ship in a shipyard section.
pub fn normalize_ships(section: &Value) -> Result<Vec<ShipIdentity>, EdapiError> {
    shipyard_ids(section)
        .iter()
        .map(|id| resolve_ship(id))
        .collect()
}

/// Network names for publishing, sorted.
pub fn network_names(ships: &[ShipIdentity]) -> Vec<String> {
    let mut names: Vec<String> = ships.iter().map(|s| s.network_name.clone()).collect();
    names.sort();
    names
}
