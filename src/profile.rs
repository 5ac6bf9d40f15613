//! The commander profile snapshot.
//!
//! A read-only wrapper around the raw JSON document returned by the
//! companion service (or loaded from a captured file). Accessors expose the
//! handful of fields the rest of the crate needs; everything else stays
//! opaque.

use serde_json::{Map, Value};
use std::path::Path;

use crate::pipeline::coerce::coerce_int;
use crate::types::EdapiError;

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    raw: Value,
}

impl Profile {
    /// Parse a profile from the service's JSON body.
    pub fn from_json(body: &str) -> Result<Self, EdapiError> {
        let raw: Value = serde_json::from_str(body)
            .map_err(|e| EdapiError::ProfileParse(format!("invalid JSON: {e}")))?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, EdapiError> {
        if !raw.get("commander").is_some_and(Value::is_object) {
            return Err(EdapiError::ProfileParse(
                "document has no 'commander' section".into(),
            ));
        }
        Ok(Self { raw })
    }

    /// Load a previously captured profile from disk.
    pub fn from_file(path: &Path) -> Result<Self, EdapiError> {
        let body = std::fs::read_to_string(path).map_err(|e| {
            EdapiError::ProfileParse(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&body)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn commander(&self) -> &Value {
        &self.raw["commander"]
    }

    pub fn commander_name(&self) -> Result<&str, EdapiError> {
        self.commander()["name"]
            .as_str()
            .ok_or_else(|| EdapiError::ProfileParse("commander has no name".into()))
    }

    /// Missing or non-boolean `docked` counts as not docked.
    pub fn is_docked(&self) -> bool {
        self.commander()["docked"].as_bool().unwrap_or(false)
    }

    pub fn credits(&self) -> i64 {
        coerce_int(self.commander().get("credits")).value()
    }

    pub fn debt(&self) -> i64 {
        coerce_int(self.commander().get("debt")).value()
    }

    /// Commander ranks keyed by rank type, as raw integers.
    pub fn ranks(&self) -> Vec<(String, i64)> {
        self.commander()["rank"]
            .as_object()
            .map(|ranks| {
                ranks
                    .iter()
                    .map(|(k, v)| (k.clone(), coerce_int(Some(v)).value()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn system_name(&self) -> Result<&str, EdapiError> {
        self.raw["lastSystem"]["name"]
            .as_str()
            .ok_or_else(|| EdapiError::ProfileParse("lastSystem has no name".into()))
    }

    pub fn station_name(&self) -> Result<&str, EdapiError> {
        self.starport()?
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| EdapiError::ProfileParse("lastStarport has no name".into()))
    }

    pub fn starport(&self) -> Result<&Map<String, Value>, EdapiError> {
        self.raw["lastStarport"]
            .as_object()
            .ok_or_else(|| EdapiError::ProfileParse("document has no 'lastStarport' section".into()))
    }

    /// A named section of the last starport, if the service included it.
    pub fn starport_section(&self, key: &str) -> Option<&Value> {
        self.raw["lastStarport"].get(key)
    }

    pub fn cargo_capacity(&self) -> i64 {
        coerce_int(self.raw["ship"]["cargo"].get("capacity")).value()
    }
}
