//! File exports and profile inspection.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::profile::Profile;

/// Copy of `value` with every object's keys in sorted order.
///
/// Maps keep the service's insertion order everywhere else; exports and
/// `--tree` output are sorted so captures diff cleanly.
pub fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

/// Write the raw profile as pretty JSON with sorted keys.
pub fn export_profile(profile: &Profile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&sorted_keys(profile.raw()))
        .context("Failed to serialise profile")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write profile to {}", path.display()))?;
    info!(path = %path.display(), "Profile exported");
    Ok(())
}

/// Shell variables for the local trading tool.
pub fn env_file_contents(profile: &Profile) -> Result<String> {
    Ok(format!(
        "export TDFROM=\"{}/{}\"\nexport TDCREDITS={}\nexport TDCAPACITY={}\n",
        profile.system_name()?,
        profile.station_name()?,
        profile.credits(),
        profile.cargo_capacity(),
    ))
}

pub fn write_env_file(profile: &Profile, path: &Path) -> Result<()> {
    let contents = env_file_contents(profile)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Environment file written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Key walking
// ---------------------------------------------------------------------------

/// A key was missing while walking the profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key '{key}' not found; available: {}", available.join(", "))]
pub struct KeyWalkError {
    pub key: String,
    /// Sorted keys (or indices) at the last level reached.
    pub available: Vec<String>,
}

fn child_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            keys
        }
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Follow `keys` from the root. Array levels take numeric indices.
pub fn walk_keys<'a>(root: &'a Value, keys: &[String]) -> Result<&'a Value, KeyWalkError> {
    let mut current = root;
    for key in keys {
        let next = match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| KeyWalkError {
            key: key.clone(),
            available: child_keys(current),
        })?;
    }
    Ok(current)
}

/// Render what `--keys` found: the sorted child keys, or with `tree` the
/// whole subtree. Leaves always print as themselves.
pub fn describe(value: &Value, tree: bool) -> Result<String> {
    if tree || !(value.is_object() || value.is_array()) {
        return serde_json::to_string_pretty(&sorted_keys(value))
            .context("Failed to render subtree");
    }
    Ok(child_keys(value).join("\n"))
}
