// Air-Sentinel - Persistent Settings & Calibration Log
//
// Single owner of the runtime configuration. Every mutation goes through
// `ConfigStore::update`, which rewrites `config.json` wholesale and, when the
// calibration offset changes, appends one line to `cal_history.txt`.
//
// Storage failures never roll back the in-memory value: the device keeps
// running on what it has and the next mutation tries the write again.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::LocalTime;
use crate::config::*;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ssid: String,
    #[serde(rename = "pass")]
    pub password: String,
    #[serde(rename = "lat")]
    pub latitude: String,
    #[serde(rename = "lon")]
    pub longitude: String,
    #[serde(rename = "auto")]
    pub auto_cycle: bool,
    pub offset: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            latitude: DEFAULT_LAT.to_string(),
            longitude: DEFAULT_LON.to_string(),
            auto_cycle: false,
            offset: DEFAULT_OFFSET_V,
        }
    }
}

/// Partial change; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub ssid: Option<String>,
    pub password: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub auto_cycle: Option<bool>,
    pub offset: Option<f32>,
}

// ---------------------------------------------------------------------------
// Storage backend
// ---------------------------------------------------------------------------
pub trait Storage {
    fn read(&self, name: &str) -> Result<String>;
    fn write(&mut self, name: &str, contents: &str) -> Result<()>;
    fn append(&mut self, name: &str, contents: &str) -> Result<()>;
}

/// Plain files under one directory (the SPIFFS mount point on the device).
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Storage for FsStorage {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.root.join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn append(&mut self, name: &str, contents: &str) -> Result<()> {
        let path = self.root.join(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------
pub struct ConfigStore<S: Storage> {
    storage: S,
    settings: Settings,
}

impl<S: Storage> ConfigStore<S> {
    /// Load settings, recreating the file with defaults when it is missing or
    /// unreadable. Keys absent from an otherwise valid file take defaults.
    pub fn load(storage: S) -> Self {
        let parsed = storage
            .read(CONFIG_FILE)
            .and_then(|text| serde_json::from_str::<Settings>(&text).map_err(Into::into));

        match parsed {
            Ok(settings) => {
                info!("Config loaded (ssid={:?}, auto={})", settings.ssid, settings.auto_cycle);
                Self { storage, settings }
            }
            Err(e) => {
                warn!("Config not found or corrupt ({:#}) - writing defaults", e);
                let mut store = Self {
                    storage,
                    settings: Settings::default(),
                };
                if let Err(e) = store.persist() {
                    warn!("Could not write default config: {:#}", e);
                }
                store
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply `update` in memory, then persist. A new offset is also appended
    /// to the calibration log stamped with `stamp`.
    ///
    /// The in-memory settings are updated even when this returns an error.
    pub fn update(&mut self, update: SettingsUpdate, stamp: LocalTime) -> Result<()> {
        let SettingsUpdate {
            ssid,
            password,
            latitude,
            longitude,
            auto_cycle,
            offset,
        } = update;

        if let Some(v) = ssid {
            self.settings.ssid = v;
        }
        if let Some(v) = password {
            self.settings.password = v;
        }
        if let Some(v) = latitude {
            self.settings.latitude = v;
        }
        if let Some(v) = longitude {
            self.settings.longitude = v;
        }
        if let Some(v) = auto_cycle {
            self.settings.auto_cycle = v;
        }

        let log_result = match offset {
            Some(v) => {
                self.settings.offset = v;
                self.log_calibration(v, stamp)
            }
            None => Ok(()),
        };

        self.persist()?;
        log_result
    }

    /// Full calibration history, or `None` if nothing was ever logged.
    pub fn calibration_log(&self) -> Option<String> {
        self.storage.read(LOG_FILE).ok()
    }

    fn log_calibration(&mut self, offset: f32, stamp: LocalTime) -> Result<()> {
        let line = format!("{}, {:.4}\n", stamp.log_stamp(), offset);
        self.storage.append(LOG_FILE, &line)?;
        info!("Calibration logged: {}", line.trim_end());
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let payload = serde_json::to_string(&self.settings)?;
        self.storage.write(CONFIG_FILE, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemStorage, STAMP};

    #[test]
    fn missing_file_is_recreated_with_defaults() {
        let store = ConfigStore::load(MemStorage::default());
        assert_eq!(store.settings(), &Settings::default());

        let written = store.storage.read(CONFIG_FILE).unwrap();
        let reparsed: Settings = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, Settings::default());
    }

    #[test]
    fn corrupt_file_is_replaced() {
        let mut storage = MemStorage::default();
        storage.write(CONFIG_FILE, "{not json").unwrap();
        let store = ConfigStore::load(storage);
        assert_eq!(store.settings(), &Settings::default());
        assert!(store.storage.read(CONFIG_FILE).unwrap().starts_with('{'));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let mut storage = MemStorage::default();
        storage
            .write(CONFIG_FILE, r#"{"ssid":"home","offset":0.71}"#)
            .unwrap();
        let store = ConfigStore::load(storage);
        assert_eq!(store.settings().ssid, "home");
        assert_eq!(store.settings().offset, 0.71);
        assert_eq!(store.settings().latitude, DEFAULT_LAT);
        assert!(!store.settings().auto_cycle);
    }

    #[test]
    fn saved_settings_load_back_unchanged() {
        let mut store = ConfigStore::load(MemStorage::default());
        store
            .update(
                SettingsUpdate {
                    ssid: Some("Café Wi-Fi".into()),
                    password: Some("p@ss w0rd&=".into()),
                    latitude: Some("-33.8688".into()),
                    longitude: Some("151.2093".into()),
                    auto_cycle: Some(true),
                    offset: Some(0.4321),
                },
                STAMP,
            )
            .unwrap();

        let expected = store.settings().clone();
        let reloaded = ConfigStore::load(store.storage);
        assert_eq!(reloaded.settings(), &expected);
    }

    #[test]
    fn offset_change_appends_one_log_line() {
        let mut store = ConfigStore::load(MemStorage::default());
        assert_eq!(store.calibration_log(), None);

        store
            .update(
                SettingsUpdate {
                    offset: Some(0.61234),
                    ..Default::default()
                },
                STAMP,
            )
            .unwrap();
        store
            .update(
                SettingsUpdate {
                    auto_cycle: Some(true),
                    ..Default::default()
                },
                STAMP,
            )
            .unwrap();

        assert_eq!(
            store.calibration_log().as_deref(),
            Some("2026-03-07 09:05, 0.6123\n")
        );
    }

    #[test]
    fn failed_write_still_updates_memory() {
        let mut store = ConfigStore::load(MemStorage::default());
        store.storage.fail_writes = true;

        let result = store.update(
            SettingsUpdate {
                offset: Some(0.9),
                ..Default::default()
            },
            STAMP,
        );
        assert!(result.is_err());
        assert_eq!(store.settings().offset, 0.9);
    }

    #[test]
    fn fs_storage_writes_and_appends() {
        let dir = std::env::temp_dir().join(format!("airsentinel-store-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut storage = FsStorage::new(&dir);

        storage.write("a.txt", "one").unwrap();
        storage.write("a.txt", "two").unwrap();
        storage.append("b.txt", "x\n").unwrap();
        storage.append("b.txt", "y\n").unwrap();

        assert_eq!(storage.read("a.txt").unwrap(), "two");
        assert_eq!(storage.read("b.txt").unwrap(), "x\ny\n");
        assert!(storage.read("missing.txt").is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
