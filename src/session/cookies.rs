//! Persistent cookie jar.
//!
//! The companion service keeps the login in cookies, so they are saved to
//! `<basename>.cookies` after every request. The file is plain JSON
//! (name to value) and is created with mode 0600 on Unix.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the jar from `path`, or create and save an empty one if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let jar = Self::new();
            jar.save(path)?;
            info!(path = %path.display(), "Created empty cookie jar");
            return Ok(jar);
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cookies from {}", path.display()))?;
        let jar: CookieJar = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse cookies from {}", path.display()))?;

        debug!(path = %path.display(), count = jar.len(), "Cookie jar loaded");
        Ok(jar)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialise cookies")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write cookies to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
        }

        debug!(path = %path.display(), count = self.len(), "Cookie jar saved");
        Ok(())
    }

    /// Absorb one `Set-Cookie` header value. Only the name and value are
    /// kept; an empty value or `Max-Age=0` removes the cookie.
    pub fn absorb(&mut self, set_cookie: &str) {
        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        if name.is_empty() {
            return;
        }

        let expired = parts.any(|attr| {
            attr.split_once('=').is_some_and(|(k, v)| {
                k.trim().eq_ignore_ascii_case("max-age") && v.trim().parse::<i64>().is_ok_and(|n| n <= 0)
            })
        });

        if value.is_empty() || expired {
            self.cookies.remove(name);
        } else {
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }

    /// The `Cookie` request header, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        Some(pairs.join("; "))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
