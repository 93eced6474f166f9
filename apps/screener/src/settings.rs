//! User-configurable credential and sampling temperature, persisted in the
//! key-value store.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::AnalysisConfig;
use crate::storage::{KeyValueStore, StorageError};

pub const API_KEY_KEY: &str = "screener:api_key";
pub const TEMPERATURE_KEY: &str = "screener:temperature";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Clamps to [0.0, 1.0]. NaN maps to the default.
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Parses a stored temperature string, clamping out-of-range values.
fn parse_temperature(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().map(clamp_temperature)
}

#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
    /// Credential from the environment, used when none has been stored.
    fallback_api_key: Option<String>,
    output_language: String,
}

impl Settings {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fallback_api_key: Option<String>,
        output_language: String,
    ) -> Self {
        Self {
            store,
            fallback_api_key: fallback_api_key.filter(|k| !k.trim().is_empty()),
            output_language,
        }
    }

    pub async fn api_key(&self) -> Result<Option<String>, StorageError> {
        let stored = self
            .store
            .get(API_KEY_KEY)
            .await?
            .filter(|k| !k.trim().is_empty());
        Ok(stored.or_else(|| self.fallback_api_key.clone()))
    }

    /// Stores the credential. A blank value clears it.
    pub async fn set_api_key(&self, api_key: &str) -> Result<(), StorageError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return self.clear_api_key().await;
        }
        self.store.set(API_KEY_KEY, api_key).await?;
        info!("API key updated");
        Ok(())
    }

    pub async fn clear_api_key(&self) -> Result<(), StorageError> {
        self.store.delete(API_KEY_KEY).await?;
        info!("API key cleared");
        Ok(())
    }

    pub async fn temperature(&self) -> Result<f32, StorageError> {
        let raw = self.store.get(TEMPERATURE_KEY).await?;
        Ok(match raw {
            None => DEFAULT_TEMPERATURE,
            Some(raw) => parse_temperature(&raw).unwrap_or_else(|| {
                warn!("Ignoring unparseable stored temperature '{raw}'");
                DEFAULT_TEMPERATURE
            }),
        })
    }

    /// Clamps and persists the temperature, returning the stored value.
    pub async fn set_temperature(&self, value: f32) -> Result<f32, StorageError> {
        let value = clamp_temperature(value);
        // Debug formatting keeps the decimal point ("1.0", not "1").
        self.store.set(TEMPERATURE_KEY, &format!("{value:?}")).await?;
        Ok(value)
    }

    /// Snapshot handed to the analysis client for the duration of one call
    /// or one batch.
    pub async fn analysis_config(&self) -> Result<AnalysisConfig, StorageError> {
        Ok(AnalysisConfig {
            api_key: self.api_key().await?,
            temperature: self.temperature().await?,
            output_language: self.output_language.clone(),
        })
    }
}
