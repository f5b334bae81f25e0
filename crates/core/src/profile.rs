//! User Profile and Persistence Contract
//!
//! The profile is the only state that outlives a session: a flat document
//! with the user's name, validated age, and free-form preferences. The
//! `ProfileStore` trait defines the persistence contract the engine consumes;
//! a JSON-file implementation and an in-memory implementation are provided.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// Inclusive range of ages the engine accepts.
pub const AGE_RANGE: std::ops::RangeInclusive<u8> = 5..=50;

/// Derived age category controlling prompt wording and listening timeouts.
///
/// Never stored; always recomputed from `UserProfile::age`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgeBand {
    Child,
    Teen,
    Adult,
}

impl AgeBand {
    pub fn from_age(age: u8) -> Self {
        if age <= 12 {
            AgeBand::Child
        } else if age <= 18 {
            AgeBand::Teen
        } else {
            AgeBand::Adult
        }
    }

    /// How long to wait for speech input. Younger users get more time.
    pub fn listen_timeout(self) -> Duration {
        match self {
            AgeBand::Child => Duration::from_secs(15),
            AgeBand::Teen => Duration::from_secs(12),
            AgeBand::Adult => Duration::from_secs(10),
        }
    }
}

/// Listening timeout before the user's age is known.
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(10);

/// The persisted user record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u8,
    #[serde(default)]
    pub preferences: HashMap<String, String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, age: u8) -> Self {
        Self {
            name: name.into(),
            age,
            preferences: HashMap::new(),
        }
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::from_age(self.age)
    }
}

/// Persistence contract consumed by the dialogue engine.
///
/// `load` never fails on a missing or corrupt backing store: it returns
/// `Ok(None)` and the engine treats the caller as a first-time user. `save`
/// failures are surfaced as errors, but the engine treats them as non-fatal.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self) -> Result<Option<UserProfile>>;
    async fn save(&self, profile: &UserProfile) -> Result<()>;
}

/// File-backed store persisting the profile as a flat JSON document.
///
/// Saves are serialized through an internal mutex so concurrent sessions
/// sharing one store cannot interleave writes.
pub struct JsonProfileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn load(&self) -> Result<Option<UserProfile>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read profile; treating as first-time user");
                return Ok(None);
            }
        };
        match serde_json::from_slice::<UserProfile>(&bytes) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Profile document is corrupt; treating as first-time user");
                Ok(None)
            }
        }
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let json = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write profile to {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryProfileStore {
    slot: Mutex<Option<UserProfile>>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self) -> Result<Option<UserProfile>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        *self.slot.lock().await = Some(profile.clone());
        Ok(())
    }
}
