// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sort engine settings, loadable from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for config parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Settings consulted by every sort that actually runs.
///
/// Missing JSON keys fall back to [`FieldsConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Re-check adjacent keys after sorting and warn on duplicates.
    /// Defaults to on in debug builds.
    pub verify_order: bool,
    /// Emit a `trace` event for every adjacent swap.
    pub trace_swaps: bool,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            verify_order: cfg!(debug_assertions),
            trace_swaps: false,
        }
    }
}

impl FieldsConfig {
    /// Parses a JSON config blob. An empty blob yields the defaults.
    ///
    /// # Errors
    /// [`ConfigError::Serde`] on malformed JSON.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    /// [`ConfigError::Serde`] if serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
