//! Best-effort cache of external entity state
//!
//! Entity data is optional. A failed fetch leaves the previous snapshot (or an
//! empty one) in place and is never allowed to fail a compile; templates that
//! don't reference entities compile the same either way.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default entity endpoint when running as a Home Assistant add-on
pub const DEFAULT_ENTITIES_URL: &str = "http://supervisor/core/api/states";

/// Entity record as returned by the states endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityRecord {
    pub entity_id: String,
    #[serde(default)]
    pub state: serde_json::Value,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// State and attributes of one entity, as exposed to templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub state: serde_json::Value,
    pub attributes: serde_json::Value,
}

/// Entity id → state, sorted for deterministic rendering
pub type EntitySnapshot = BTreeMap<String, EntityState>;

/// Why entity data is unavailable
#[derive(Debug, Error)]
pub enum FetchError {
    /// No endpoint or credentials configured
    #[error("entity source not configured")]
    NotConfigured,

    /// Endpoint rejected the token
    #[error("entity source rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    /// Network or HTTP failure
    #[error("entity source unreachable: {0}")]
    Transport(String),

    /// Response body was not a list of entity records
    #[error("invalid entity response: {0}")]
    Decode(String),
}

/// Source of entity records
pub trait EntityFetcher: Send + Sync {
    fn fetch(&self) -> Result<Vec<EntityRecord>, FetchError>;
}

/// Fetches entity states over HTTP with a bearer token
pub struct HttpEntityFetcher {
    url: String,
    token: String,
    agent: ureq::Agent,
}

impl HttpEntityFetcher {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .into();
        Self {
            url: url.into(),
            token: token.into(),
            agent,
        }
    }
}

impl EntityFetcher for HttpEntityFetcher {
    fn fetch(&self) -> Result<Vec<EntityRecord>, FetchError> {
        let mut response = self
            .agent
            .get(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code @ (401 | 403)) => FetchError::Unauthorized(code),
                other => FetchError::Transport(other.to_string()),
            })?;

        response
            .body_mut()
            .read_json::<Vec<EntityRecord>>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Holds the most recent successful entity snapshot.
pub struct EntityCache {
    fetcher: Option<Box<dyn EntityFetcher>>,
    snapshot: RwLock<Arc<EntitySnapshot>>,
}

impl EntityCache {
    /// Cache backed by `fetcher`
    pub fn new(fetcher: Box<dyn EntityFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
            snapshot: RwLock::new(Arc::new(EntitySnapshot::new())),
        }
    }

    /// Cache with no entity source; always empty
    pub fn disabled() -> Self {
        Self {
            fetcher: None,
            snapshot: RwLock::new(Arc::new(EntitySnapshot::new())),
        }
    }

    /// Whether an entity source is configured
    pub fn is_enabled(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Fetch fresh data and swap it in.
    ///
    /// On failure the previous snapshot is kept and the reason is returned.
    pub fn refresh(&self) -> Result<Arc<EntitySnapshot>, FetchError> {
        let fetcher = self.fetcher.as_ref().ok_or(FetchError::NotConfigured)?;
        let records = fetcher.fetch()?;

        let snapshot: EntitySnapshot = records
            .into_iter()
            .map(|r| {
                (
                    r.entity_id,
                    EntityState {
                        state: r.state,
                        attributes: r.attributes,
                    },
                )
            })
            .collect();
        let snapshot = Arc::new(snapshot);

        *self.snapshot.write() = snapshot.clone();
        Ok(snapshot)
    }

    /// Latest snapshot; empty if no fetch ever succeeded
    pub fn get(&self) -> Arc<EntitySnapshot> {
        self.snapshot.read().clone()
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("enabled", &self.is_enabled())
            .field("entities", &self.get().len())
            .finish()
    }
}
