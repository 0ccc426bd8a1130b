//! Index lifecycle management.
//!
//! The index is created from a settings document embedded at compile time
//! (`index_settings.json`): shard and replica counts plus the field mapping,
//! including the `title.prefix` sub-field backing type-ahead. The settings
//! are read-only after load; changing them means redeploying the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::SearchClient;

static INDEX_SETTINGS_JSON: &str = include_str!("../index_settings.json");

/// Declarative index settings: shard/replica counts and field mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Mappings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_shards: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_replicas: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mappings {
    pub properties: BTreeMap<String, FieldMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<SubFields>,
}

/// Secondary sub-field definitions, e.g. the prefix-matching sub-field used
/// for type-ahead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PrefixField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixField {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Parses the embedded settings document.
pub fn default_settings() -> Result<IndexSettings> {
    serde_json::from_str(INDEX_SETTINGS_JSON).context("Failed to parse embedded index settings")
}

impl SearchClient {
    /// Creates the index with the embedded settings if it does not already
    /// exist. Idempotent; called at startup.
    pub async fn ensure_index(&self) -> Result<()> {
        let response = self
            .request(reqwest::Method::HEAD, self.index_name())
            .send()
            .await
            .context("error checking index existence")?;
        if response.status().is_success() {
            return Ok(());
        }
        self.create_index().await
    }

    pub async fn create_index(&self) -> Result<()> {
        let settings = default_settings()?;
        let response = self
            .request(reqwest::Method::PUT, self.index_name())
            .json(&settings)
            .send()
            .await
            .context("error creating index")?;
        Self::check(response, "creating index").await?;
        tracing::info!(index = %self.index_name(), "created index");
        Ok(())
    }

    /// Deletes the index. A missing index is not an error.
    pub async fn delete_index(&self) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, self.index_name())
            .send()
            .await
            .context("error deleting index")?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("error deleting index: backend returned {}: {}", status, body);
        }
        Ok(())
    }

    /// Delete-then-recreate. Destructive; privileged callers only.
    pub async fn reset_index(&self) -> Result<()> {
        self.delete_index().await?;
        self.create_index().await
    }

    /// Live settings for the index as the backend currently reports them.
    pub async fn index_info(&self) -> Result<serde_json::Value> {
        let response = self
            .request(reqwest::Method::GET, self.index_name())
            .send()
            .await
            .context("error getting index settings")?;
        let response = Self::check(response, "getting index settings").await?;
        let info: serde_json::Value = response
            .json()
            .await
            .context("error decoding index settings")?;
        Ok(info)
    }
}
