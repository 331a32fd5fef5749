//! Persisted user settings — key-value store seam plus a JSON file backend.
//!
//! Values are stored as JSON under fixed keys. A missing or undecodable
//! value never fails a read: the documented default is used and a warning
//! is logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::color::Color;
use crate::config::Config;
use crate::error::{LightPanelError, Result};
use crate::mask::{self, MaskShapeSet};
use crate::slots::CustomColors;

/// Storage keys.
pub mod keys {
    pub const CUSTOM_COLORS: &str = "light-panel-custom-colors";
    pub const MASK_SHAPES: &str = "light-panel-mask-shapes";
    pub const MASK_SIZE: &str = "light-panel-mask-size";
    pub const MUTED: &str = "light-panel-muted";
    pub const ROTATE_COLORS: &str = "light-panel-rotate-colors";
    pub const STROBE_EFFECT: &str = "light-panel-strobe-effect";
    pub const FLAG_MODE: &str = "light-panel-flag-mode";
    pub const HORIZONTAL_SPLIT: &str = "light-panel-horizontal-split";

    pub const ALL: [&str; 8] = [
        CUSTOM_COLORS,
        MASK_SHAPES,
        MASK_SIZE,
        MUTED,
        ROTATE_COLORS,
        STROBE_EFFECT,
        FLAG_MODE,
        HORIZONTAL_SPLIT,
    ];
}

/// Key-value persistence collaborator.
pub trait SettingsStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<()>;

    /// Typed read with fallback. Undecodable values log a warning.
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        let Some(value) = self.get_value(key) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("[settings] ignoring stored {key}: {e}");
                default
            }
        }
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let value =
            serde_json::to_value(value).map_err(|e| LightPanelError::Store(format!("{key}: {e}")))?;
        self.set_value(key, value)
    }
}

/// In-process store, used by tests and sessions that should not persist.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object file, rewritten atomically on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Default location next to the config file.
    pub fn default_path() -> Option<PathBuf> {
        Config::dir().map(|d| d.join("settings.json"))
    }

    /// Open the store at `path`, returning any load warnings.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// also an empty store, plus a warning; it is overwritten on the next
    /// write.
    pub fn open(path: &Path) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let values = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warnings.push(format!(
                        "settings file is not a JSON object ({}), using defaults",
                        path.display()
                    ));
                    Map::new()
                }
                Err(e) => {
                    warnings.push(format!(
                        "settings parse error ({}), using defaults: {e}",
                        path.display()
                    ));
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warnings.push(format!(
                    "could not read settings ({}), using defaults: {e}",
                    path.display()
                ));
                Map::new()
            }
        };
        (
            JsonFileStore {
                path: path.to_path_buf(),
                values,
            },
            warnings,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(&self.values).map_err(std::io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(&self.path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.save()?;
        Ok(())
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub custom_colors: CustomColors,
    pub masks: MaskShapeSet,
    pub mask_size: u8,
    pub muted: bool,
    pub rotate_colors: bool,
    pub strobe_effect: bool,
    pub flag_mode: bool,
    pub horizontal_split: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            custom_colors: CustomColors::default(),
            masks: MaskShapeSet::default(),
            mask_size: mask::DEFAULT_MASK_SIZE,
            muted: false,
            rotate_colors: false,
            strobe_effect: false,
            flag_mode: false,
            horizontal_split: false,
        }
    }
}

impl Settings {
    /// Read every key, falling back per key to its default.
    pub fn load(store: &impl SettingsStore) -> Self {
        let d = Settings::default();
        let custom_colors = store
            .get_or::<Option<Vec<Option<Color>>>>(keys::CUSTOM_COLORS, None)
            .map(CustomColors::from_stored)
            .unwrap_or(d.custom_colors);
        let masks = store
            .get_or::<Option<Vec<String>>>(keys::MASK_SHAPES, None)
            .map(|tags| MaskShapeSet::from_tags(&tags))
            .unwrap_or(d.masks);
        let mask_size = store
            .get_or::<Option<i64>>(keys::MASK_SIZE, None)
            .map(mask::clamp_mask_size)
            .unwrap_or(d.mask_size);
        Settings {
            custom_colors,
            masks,
            mask_size,
            muted: store.get_or(keys::MUTED, d.muted),
            rotate_colors: store.get_or(keys::ROTATE_COLORS, d.rotate_colors),
            strobe_effect: store.get_or(keys::STROBE_EFFECT, d.strobe_effect),
            flag_mode: store.get_or(keys::FLAG_MODE, d.flag_mode),
            horizontal_split: store.get_or(keys::HORIZONTAL_SPLIT, d.horizontal_split),
        }
    }
}
