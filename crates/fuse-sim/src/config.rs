// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulation settings plus the config service and storage port.

use fuse_fixed::Fix;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimError;

/// Which broad phase the collision pass indexes bodies with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseKind {
    /// Partitioned bounding-box tree.
    #[default]
    Tree,
    /// Uniform-grid tile hash.
    Tiles,
}

/// Tunables for a [`crate::Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Tree build partitions (and threads).
    pub workers: usize,
    /// Bodies past this count are left out of the index each tick.
    pub max_entries_per_build: usize,
    /// Index used by the collision and blast passes.
    pub broad_phase: BroadPhaseKind,
    /// Tile side length for [`BroadPhaseKind::Tiles`].
    pub tile_size: Fix,
    /// Fixed time step.
    pub dt: Fix,
    /// When set, bodies are enumerated in a seeded permutation of handle
    /// order before the entry cap applies.
    pub enumeration_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            max_entries_per_build: usize::MAX,
            broad_phase: BroadPhaseKind::Tree,
            tile_size: Fix::from_int(4),
            // 1/60 s.
            dt: Fix::from_raw(71_582_788),
            enumeration_seed: None,
        }
    }
}

impl SimConfig {
    /// Key under which the config is persisted.
    pub const KEY: &'static str = "fuse-sim";

    /// Rejects zero workers, a non-positive tile size and a negative step.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.workers == 0 {
            return Err(SimError::InvalidConfig("workers must be at least 1".into()));
        }
        if !self.tile_size.is_positive() {
            return Err(SimError::InvalidConfig(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.dt.is_negative() {
            return Err(SimError::InvalidConfig(format!(
                "dt must not be negative, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

/// Where [`ConfigService`] keeps serialized settings.
///
/// The CLI backs this with one JSON file per key; tests use an in-memory map.
pub trait ConfigStore {
    /// Bytes stored under `key`, or [`ConfigError::NotFound`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces whatever is stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure while reading or writing stored settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing is stored under the key.
    #[error("no config stored under `{0}`")]
    NotFound(String),
    /// The backing store could not be read or written.
    #[error("config store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes are not valid JSON for the requested type.
    #[error("malformed config json: {0}")]
    Serde(#[from] serde_json::Error),
    /// Stored settings parsed but would not build a simulation.
    #[error("stored config rejected: {0}")]
    Invalid(#[from] SimError),
    /// Store-specific failure (e.g. no config directory on this platform).
    #[error("{0}")]
    Other(String),
}

/// JSON codec over a [`ConfigStore`].
///
/// [`ConfigService::load_sim_config`] and [`ConfigService::save_sim_config`]
/// cover the one document Fuse persists; `load`/`save` take any serde type.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Decodes the value under `key`; a missing key or an empty blob is
    /// `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Encodes `value` as pretty JSON under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Stored [`SimConfig`] under [`SimConfig::KEY`], validated.
    ///
    /// Fields missing from the document take their defaults.
    pub fn load_sim_config(&self) -> Result<Option<SimConfig>, ConfigError> {
        let Some(config) = self.load::<SimConfig>(SimConfig::KEY)? else {
            return Ok(None);
        };
        config.validate()?;
        Ok(Some(config))
    }

    /// Validates `config` and stores it under [`SimConfig::KEY`].
    pub fn save_sim_config(&self, config: &SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.save(SimConfig::KEY, config)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryStore {
        blobs: RefCell<BTreeMap<String, Vec<u8>>>,
    }

    impl ConfigStore for MemoryStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.blobs
                .borrow()
                .get(key)
                .cloned()
                .ok_or_else(|| ConfigError::NotFound(key.to_owned()))
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.blobs.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_key_loads_as_none() {
        let service = ConfigService::new(MemoryStore::default());
        let loaded: Option<SimConfig> = service.load(SimConfig::KEY).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn saved_config_loads_back() {
        let service = ConfigService::new(MemoryStore::default());
        let config = SimConfig {
            workers: 3,
            broad_phase: BroadPhaseKind::Tiles,
            enumeration_seed: Some(11),
            ..SimConfig::default()
        };
        service.save(SimConfig::KEY, &config).unwrap();
        assert_eq!(service.load(SimConfig::KEY).unwrap(), Some(config));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let store = MemoryStore::default();
        store
            .save_raw(SimConfig::KEY, br#"{"workers": 4, "broad_phase": "tiles"}"#)
            .unwrap();
        let service = ConfigService::new(store);
        let config: SimConfig = service.load(SimConfig::KEY).unwrap().unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.broad_phase, BroadPhaseKind::Tiles);
        assert_eq!(config.dt, SimConfig::default().dt);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_workers = SimConfig {
            workers: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            zero_workers.validate(),
            Err(SimError::InvalidConfig(_))
        ));
        let zero_tiles = SimConfig {
            tile_size: Fix::ZERO,
            ..SimConfig::default()
        };
        assert!(zero_tiles.validate().is_err());
        let backwards = SimConfig {
            dt: Fix::NEG_ONE,
            ..SimConfig::default()
        };
        assert!(backwards.validate().is_err());
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn stored_invalid_config_is_rejected_on_load() {
        let store = MemoryStore::default();
        store
            .save_raw(SimConfig::KEY, br#"{"workers": 0}"#)
            .unwrap();
        let service = ConfigService::new(store);
        assert!(matches!(
            service.load_sim_config(),
            Err(ConfigError::Invalid(SimError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn invalid_config_is_never_written() {
        let service = ConfigService::new(MemoryStore::default());
        let bad = SimConfig {
            tile_size: Fix::ZERO,
            ..SimConfig::default()
        };
        assert!(service.save_sim_config(&bad).is_err());
        assert_eq!(service.load_sim_config().unwrap(), None);
        service.save_sim_config(&SimConfig::default()).unwrap();
        assert_eq!(
            service.load_sim_config().unwrap(),
            Some(SimConfig::default())
        );
    }
}
