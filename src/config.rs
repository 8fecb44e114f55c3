use std::time::Duration;

use log::{warn, LevelFilter};
use serde::Deserialize;

use crate::snapshot::DEFAULT_MARKER_ATTRIBUTE;

const LOCALSTORAGE_KEY: &str = "editable-history-config";

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period after the last input before a snapshot is taken.
    pub debounce_ms: u32,
    /// How long the "saved" indicator stays up.
    pub status_ms: u32,
    pub marker_attribute: String,
    /// Evict the oldest snapshots beyond this many. Unbounded when absent.
    pub history_limit: Option<usize>,
    /// Take a snapshot of the initial content once the editor is mounted.
    pub baseline_snapshot: bool,
    pub log_level: LevelFilter,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            status_ms: 1000,
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            history_limit: None,
            baseline_snapshot: true,
            log_level: LevelFilter::Info,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read overrides from `localStorage`, falling back to defaults.
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|storage| storage.get_item(LOCALSTORAGE_KEY).ok().flatten());

        match stored {
            Some(json) => Self::from_json(&json).unwrap_or_else(|err| {
                warn!("ignoring invalid {}: {}", LOCALSTORAGE_KEY, err);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.into())
    }

    pub fn status(&self) -> Duration {
        Duration::from_millis(self.status_ms.into())
    }
}
