//! Auto-save persistence
//!
//! The editor mirrors its graph into durable storage under a fixed key after
//! every mutation, and reads it back when a session starts. Storage sits
//! behind the [`PersistenceAdapter`] trait so sessions can be driven by an
//! in-memory fake in tests and by a directory of JSON files in the app.
//!
//! Auto-save is best effort: [`auto_save_persist`] and [`auto_save_restore`]
//! log failures and never propagate them.
//!
//! # Example
//!
//! ```ignore
//! use pipeline_graph::persistence::{FilePersistence, auto_save_restore};
//!
//! let adapter = FilePersistence::new(".mammoth", "mammoth-workflow-autosave");
//! let restored = auto_save_restore(&adapter); // None on first run
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::document::{self, GraphDocument};
use crate::error::{GraphError, Result};
use crate::store::GraphStore;

/// Default key the auto-saved graph is stored under
pub const AUTOSAVE_KEY: &str = "mammoth-workflow-autosave";

/// Editor chrome state stored next to the graph; irrelevant to graph correctness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub palette_visible: bool,
    pub palette_width: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            palette_visible: true,
            palette_width: 280.0,
        }
    }
}

/// The value stored under the auto-save key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveRecord {
    #[serde(flatten)]
    pub document: GraphDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_state: Option<UiState>,
}

impl AutoSaveRecord {
    /// Encode as the JSON text held by the storage
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode stored JSON text
    ///
    /// Graph arrays are decoded leniently; `savedAt` and `version` fall back
    /// to "now" and the current version when unreadable.
    pub fn decode(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| GraphError::malformed(format!("auto-save is not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(GraphError::malformed("auto-save is not a JSON object"));
        }

        let mut document = GraphDocument::from_contents(document::deserialize(&value));
        if let Some(version) = value.get("version").and_then(|v| v.as_str()) {
            document.version = version.to_string();
        }
        if let Some(saved_at) = value
            .get("savedAt")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
        {
            document.saved_at = saved_at;
        }
        let ui_state = value
            .get("uiState")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Ok(Self { document, ui_state })
    }
}

/// Durable storage for the auto-saved graph
pub trait PersistenceAdapter: Send + Sync {
    /// Read the stored record; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<AutoSaveRecord>>;

    /// Overwrite the stored record
    fn save(&self, record: &AutoSaveRecord) -> Result<()>;
}

/// In-memory storage
///
/// Clones share the same slot, so a test can keep a handle after moving
/// one into a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }

    /// Overwrite the stored text directly (e.g. with corrupt JSON)
    pub fn set_raw(&self, text: impl Into<String>) {
        *self.slot.lock() = Some(text.into());
    }

    /// Make subsequent writes fail, as a full storage quota would
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

impl PersistenceAdapter for MemoryPersistence {
    fn load(&self) -> Result<Option<AutoSaveRecord>> {
        match self.slot.lock().as_deref() {
            Some(text) => AutoSaveRecord::decode(text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, record: &AutoSaveRecord) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(GraphError::storage("quota exceeded"));
        }
        let text = record.encode()?;
        *self.slot.lock() = Some(text);
        Ok(())
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
    key: String,
}

impl FilePersistence {
    /// Store under `<dir>/<key>.json`
    ///
    /// The directory will be created if it doesn't exist when saving.
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

impl PersistenceAdapter for FilePersistence {
    fn load(&self) -> Result<Option<AutoSaveRecord>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        AutoSaveRecord::decode(&text).map(Some)
    }

    fn save(&self, record: &AutoSaveRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path();
        // write-then-rename keeps the previous record intact if the write fails
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, record.encode()?)?;
        std::fs::rename(&tmp, &path)?;
        log::debug!("Auto-saved workflow to {:?}", path);
        Ok(())
    }
}

/// Mirror the store into durable storage
///
/// Returns whether the write succeeded. Failures are logged and swallowed.
pub fn auto_save_persist(
    adapter: &dyn PersistenceAdapter,
    store: &GraphStore,
    ui_state: Option<UiState>,
) -> bool {
    let record = AutoSaveRecord {
        document: document::serialize(store),
        ui_state,
    };
    match adapter.save(&record) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Auto-save failed: {}", e);
            false
        }
    }
}

/// Read the auto-saved record
///
/// Absent when nothing was saved or the stored value cannot be parsed.
pub fn auto_save_restore(adapter: &dyn PersistenceAdapter) -> Option<AutoSaveRecord> {
    match adapter.load() {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Discarding unreadable auto-save: {}", e);
            None
        }
    }
}
