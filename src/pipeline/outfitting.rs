//! Outfitting filter and catalog mapping.

use serde_json::Value;

use super::coerce::coerce_int;
use crate::tables::modules::module_by_id;
use crate::types::{EdapiError, OutfittingEntry};

/// SKU attached to modules that only need the planetary landings expansion.
/// Anything carrying a different SKU is commander-specific.
pub const PLANETARY_LANDINGS_SKU: &str = "ELITE_HORIZONS_V_PLANETARY_LANDINGS";

fn purchasable(module: &Value) -> bool {
    match module.get("sku") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == PLANETARY_LANDINGS_SKU,
        Some(_) => false,
    }
}

/// Hardpoints, internals and bulkheads. Paint jobs, decals and other
/// cosmetics fall through.
pub fn is_outfitting_name(name: &str) -> bool {
    name.starts_with("Hpt_")
        || name.starts_with("Int_")
        || name.find("_Armour_").is_some_and(|i| i > 0)
}

/// Normalize the modules section into catalog descriptors, sorted by
/// service name.
pub fn normalize_modules(section: &Value) -> Result<Vec<OutfittingEntry>, EdapiError> {
    let Some(modules) = section.as_object() else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for (key, module) in modules {
        let Some(name) = module["name"].as_str() else {
            continue;
        };
        if !purchasable(module) || !is_outfitting_name(name) {
            continue;
        }

        let id = module
            .get("id")
            .map(|v| coerce_int(Some(v)).value())
            .filter(|id| *id > 0)
            .or_else(|| key.parse::<i64>().ok())
            .ok_or_else(|| EdapiError::unknown_module(name))?;
        let record = u64::try_from(id)
            .ok()
            .and_then(module_by_id)
            .ok_or_else(|| EdapiError::unknown_module(format!("{name} ({id})")))?;

        entries.push(OutfittingEntry {
            service_name: name.to_string(),
            module: record,
        });
    }

    entries.sort_by(|a, b| a.service_name.cmp(&b.service_name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_heuristic() {
        assert!(is_outfitting_name("Hpt_PulseLaser_Fixed_Small"));
        assert!(is_outfitting_name("Int_CargoRack_Size2_Class1"));
        assert!(is_outfitting_name("SideWinder_Armour_Grade1"));
        assert!(!is_outfitting_name("_Armour_Grade1"));
        assert!(!is_outfitting_name("PaintJob_Sidewinder_Default_03"));
        assert!(!is_outfitting_name("Decal_Combat_Elite"));
    }

    #[test]
    fn test_filter_sort_and_map() {
        let section = json!({
            "128064339": { "id": 128064339, "name": "Int_CargoRack_Size2_Class1" },
            "128049381": { "id": 128049381, "name": "Hpt_PulseLaser_Fixed_Small" },
            "128049250": { "id": 128049250, "name": "SideWinder_Armour_Grade1" },
            "128672289": {
                "id": 128672289,
                "name": "Int_BuggyBay_Size2_Class2",
                "sku": "ELITE_HORIZONS_V_PLANETARY_LANDINGS"
            },
            "999": { "id": 999, "name": "Int_Secret_Module", "sku": "ELITE_SPECIFIC_V_POWER" },
            "998": { "id": 998, "name": "PaintJob_Sidewinder_Blue" }
        });
        let entries = normalize_modules(&section).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.service_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Hpt_PulseLaser_Fixed_Small",
                "Int_BuggyBay_Size2_Class2",
                "Int_CargoRack_Size2_Class1",
                "SideWinder_Armour_Grade1",
            ]
        );
        assert_eq!(entries[0].module.name, "Pulse Laser");
        assert_eq!(entries[3].module.ship.as_deref(), Some("Sidewinder"));
    }

    #[test]
    fn test_unknown_module_id_is_mapping_error() {
        let section = json!({
            "1": { "id": 1, "name": "Hpt_Experimental_Fixed_Small" }
        });
        assert!(matches!(
            normalize_modules(&section),
            Err(EdapiError::Mapping { kind: "module", .. })
        ));
    }

    #[test]
    fn test_id_falls_back_to_key() {
        let section = json!({
            "128049381": { "name": "Hpt_PulseLaser_Fixed_Small" }
        });
        let entries = normalize_modules(&section).unwrap();
        assert_eq!(entries[0].module.id, 128049381);
    }

    #[test]
    fn test_non_object_section() {
        assert!(normalize_modules(&json!([])).unwrap().is_empty());
    }
}
