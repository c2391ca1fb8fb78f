//! Persisted cart configuration
//!
//! A small flat JSON record on disk. Loading is contained (any failure falls
//! back to built-in defaults, with persisted values overlaid field by field);
//! saving is not (callers must see write failures). Saves go through a
//! sibling temp file plus rename so a concurrent reader never observes a
//! partially written record.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CartError, CartResult};

fn default_seat_spacing() -> f64 {
    80.0
}

fn default_home_row() -> u32 {
    1
}

fn default_baud() -> u32 {
    9600
}

/// User-tunable physical parameters, persisted across restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Centimeters between adjacent seat rows
    #[serde(default = "default_seat_spacing")]
    pub seat_spacing_cm: f64,
    /// Row number where the cart parks
    #[serde(default = "default_home_row")]
    pub home_row: u32,
    /// Serial device path; empty means auto-detect on connect
    #[serde(default)]
    pub serial_port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            seat_spacing_cm: default_seat_spacing(),
            home_row: default_home_row(),
            serial_port: String::new(),
            baud: default_baud(),
        }
    }
}

/// Owns the persisted record and its on-disk location
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<CartConfig>,
}

impl ConfigStore {
    /// Load the record at `path`, falling back to defaults when the file is
    /// missing, unreadable, or corrupt. Per-field serde defaults fill any
    /// keys the persisted record lacks.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = Self::load_or_default(&path);
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    fn load_or_default(path: &Path) -> CartConfig {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<CartConfig>(&raw) {
                Ok(cfg) => {
                    debug!(path = %path.display(), "Loaded cart config");
                    cfg
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt config, using defaults");
                    CartConfig::default()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No config on disk, using defaults");
                CartConfig::default()
            }
        }
    }

    /// Current record (cheap clone)
    pub fn snapshot(&self) -> CartConfig {
        self.current.read().clone()
    }

    /// Validate and apply a config update, persisting synchronously.
    ///
    /// `home_row` arrives as `i64` so a negative value reaches validation
    /// instead of being rejected upstream by deserialization. On validation
    /// or persistence failure the stored record is untouched: the new values
    /// go to disk first and only then replace the in-memory record, so memory
    /// and disk never diverge.
    pub fn update(&self, seat_spacing_cm: f64, home_row: i64) -> CartResult<CartConfig> {
        if !seat_spacing_cm.is_finite() || seat_spacing_cm <= 0.0 {
            return Err(CartError::InvalidConfig(format!(
                "seat_spacing_cm must be a positive number, got {seat_spacing_cm}"
            )));
        }
        let home_row = u32::try_from(home_row).map_err(|_| {
            CartError::InvalidConfig(format!(
                "home_row must be a non-negative integer, got {home_row}"
            ))
        })?;

        let mut current = self.current.write();
        let mut candidate = current.clone();
        candidate.seat_spacing_cm = seat_spacing_cm;
        candidate.home_row = home_row;
        self.save(&candidate)?;
        *current = candidate;
        Ok(current.clone())
    }

    /// Persist the port a connect attempt resolved, so future restarts reuse
    /// it without re-scanning. Same save-then-commit ordering as `update`.
    pub fn set_serial_port(&self, port: &str) -> CartResult<()> {
        let mut current = self.current.write();
        let mut candidate = current.clone();
        candidate.serial_port = port.to_string();
        self.save(&candidate)?;
        *current = candidate;
        Ok(())
    }

    fn save(&self, cfg: &CartConfig) -> CartResult<()> {
        let raw = serde_json::to_string_pretty(cfg)
            .map_err(|e| CartError::Persistence(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| CartError::Persistence(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CartError::Persistence(e.to_string()))?;
        debug!(path = %self.path.display(), "Saved cart config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::open(dir.path().join("config.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.snapshot(), CartConfig::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        let store = ConfigStore::open(&path);
        assert_eq!(store.snapshot(), CartConfig::default());
    }

    #[test]
    fn partial_record_is_overlaid_onto_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"seat_spacing_cm": 65.5, "unknown_key": 1}"#).unwrap();
        let store = ConfigStore::open(&path);
        let cfg = store.snapshot();
        assert_eq!(cfg.seat_spacing_cm, 65.5);
        assert_eq!(cfg.home_row, 1);
        assert_eq!(cfg.baud, 9600);
        assert_eq!(cfg.serial_port, "");
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);
        store.update(92.5, 3).unwrap();

        let reloaded = ConfigStore::open(&path);
        let cfg = reloaded.snapshot();
        assert_eq!(cfg.seat_spacing_cm, 92.5);
        assert_eq!(cfg.home_row, 3);
    }

    #[test]
    fn negative_spacing_rejected_and_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);
        store.update(80.0, 2).unwrap();

        let err = store.update(-5.0, 4).unwrap_err();
        assert!(matches!(err, CartError::InvalidConfig(_)));

        // Neither the live record nor the persisted one moved
        assert_eq!(store.snapshot().seat_spacing_cm, 80.0);
        assert_eq!(store.snapshot().home_row, 2);
        assert_eq!(ConfigStore::open(&path).snapshot().home_row, 2);
    }

    #[test]
    fn failed_save_leaves_record_unchanged() {
        // Parent directory does not exist, so the save fails; the in-memory
        // record must stay in step with the (unchanged) disk state.
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("missing").join("config.json"));

        let err = store.update(92.5, 3).unwrap_err();
        assert!(matches!(err, CartError::Persistence(_)));
        assert_eq!(store.snapshot(), CartConfig::default());

        let err = store.set_serial_port("/dev/ttyACM0").unwrap_err();
        assert!(matches!(err, CartError::Persistence(_)));
        assert_eq!(store.snapshot().serial_port, "");
    }

    #[test]
    fn negative_home_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let err = store.update(80.0, -1).unwrap_err();
        assert!(matches!(err, CartError::InvalidConfig(_)));
    }

    #[test]
    fn nan_spacing_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.update(f64::NAN, 1).is_err());
        assert!(store.update(f64::INFINITY, 1).is_err());
    }

    #[test]
    fn set_serial_port_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);
        store.set_serial_port("/dev/ttyACM0").unwrap();
        assert_eq!(
            ConfigStore::open(&path).snapshot().serial_port,
            "/dev/ttyACM0"
        );
    }
}
