//! EDDN upload client.
//!
//! Wraps each message in a `{ $schemaRef, header, message }` envelope and
//! POSTs it as JSON. In debug mode every schema ref gets a `/test` suffix
//! so uploads land on the test stream.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

use super::{CommodityMessage, OutfittingMessage, Publisher, ShipyardMessage};
use crate::config::EddnConfig;

#[derive(Debug, Serialize)]
struct Header<'a> {
    #[serde(rename = "uploaderID")]
    uploader_id: &'a str,
    #[serde(rename = "softwareName")]
    software_name: &'a str,
    #[serde(rename = "softwareVersion")]
    software_version: &'a str,
}

#[derive(Debug, Serialize)]
struct Envelope<'a, M: Serialize> {
    #[serde(rename = "$schemaRef")]
    schema_ref: String,
    header: Header<'a>,
    message: &'a M,
}

/// Lower-case hex SHA-256 of the commander name.
pub fn hashed_uploader(commander: &str) -> String {
    hex::encode(Sha256::digest(commander.as_bytes()))
}

pub struct EddnPublisher {
    http: Client,
    config: EddnConfig,
    uploader_id: String,
    test_stream: bool,
}

impl EddnPublisher {
    /// `hash_uploader` replaces the commander name with its digest;
    /// `test_stream` sends everything to the `/test` schemas.
    pub fn new(
        config: &EddnConfig,
        commander: &str,
        hash_uploader: bool,
        test_stream: bool,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("{}/{}", config.software_name, config.software_version))
            .build()
            .context("Failed to build HTTP client for EDDN")?;

        let uploader_id = if hash_uploader {
            hashed_uploader(commander)
        } else {
            commander.to_string()
        };

        Ok(Self {
            http,
            config: config.clone(),
            uploader_id,
            test_stream,
        })
    }

    pub fn uploader_id(&self) -> &str {
        &self.uploader_id
    }

    fn schema_ref(&self, schema: &str) -> String {
        if self.test_stream {
            format!("{}/test", schema.trim_end_matches('/'))
        } else {
            schema.to_string()
        }
    }

    fn envelope<'a, M: Serialize>(&'a self, schema: &str, message: &'a M) -> Envelope<'a, M> {
        Envelope {
            schema_ref: self.schema_ref(schema),
            header: Header {
                uploader_id: &self.uploader_id,
                software_name: &self.config.software_name,
                software_version: &self.config.software_version,
            },
            message,
        }
    }

    async fn post<M: Serialize + Sync>(&self, kind: &str, schema: &str, message: &M) -> Result<()> {
        let envelope = self.envelope(schema, message);
        debug!(kind, schema = %envelope.schema_ref, "Posting to EDDN");

        let resp = self
            .http
            .post(&self.config.upload_url)
            .json(&envelope)
            .send()
            .await
            .with_context(|| format!("EDDN {kind} upload failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("EDDN rejected {kind} message {status}: {body}");
        }

        info!(kind, "Published to EDDN");
        Ok(())
    }
}

#[async_trait]
impl Publisher for EddnPublisher {
    async fn publish_commodities(&self, message: &CommodityMessage) -> Result<()> {
        self.post("commodity", &self.config.commodity_schema, message).await
    }

    async fn publish_shipyard(&self, message: &ShipyardMessage) -> Result<()> {
        self.post("shipyard", &self.config.shipyard_schema, message).await
    }

    async fn publish_outfitting(&self, message: &OutfittingMessage) -> Result<()> {
        self.post("outfitting", &self.config.outfitting_schema, message).await
    }
}
