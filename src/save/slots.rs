use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::data::EngineConfig;

use super::codec::{export_to_base64, import_from_base64, load_from_json_string, save_to_json_string};
use super::model::{SaveSlotMetadata, SaveSnapshot};

/// Key/value backing store for serialized saves.
pub trait SaveStorage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, contents: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// One-time setup before first use.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl SaveStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per save inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SaveStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading save file: {}", path.display()))?;
        Ok(Some(raw))
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, contents)
            .with_context(|| format!("failed writing save file: {}", staging.display()))?;
        fs::rename(&staging, &path)
            .with_context(|| format!("failed replacing save file: {}", path.display()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed removing save file: {}", path.display()))?;
        }
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed creating save directory: {}", self.dir.display()))
    }
}

/// Numbered save slots over a [`SaveStorage`]. Reads never fail outward:
/// a missing or corrupt slot is reported as `None`.
#[derive(Debug)]
pub struct SaveSystem<S: SaveStorage> {
    storage: S,
    initialized: bool,
    max_slots: usize,
    top_score_cap: usize,
}

impl<S: SaveStorage> SaveSystem<S> {
    pub fn new(storage: S, config: &EngineConfig) -> Self {
        Self {
            storage,
            initialized: false,
            max_slots: config.max_save_slots,
            top_score_cap: config.top_score_cap,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            warn!("save system already initialized");
            return Ok(());
        }
        self.ensure_ready()
    }

    fn ensure_ready(&mut self) -> Result<()> {
        if !self.initialized {
            self.storage.prepare()?;
            self.initialized = true;
            info!(slots = self.max_slots, "save system ready");
        }
        Ok(())
    }

    pub fn slot_key(&self, slot: usize) -> Result<String> {
        if slot >= self.max_slots {
            bail!("save slot {slot} out of range (max {})", self.max_slots);
        }
        Ok(format!("save_slot_{slot}"))
    }

    pub fn save(&mut self, slot: usize, snapshot: &SaveSnapshot) -> Result<()> {
        let key = self.slot_key(slot)?;
        self.ensure_ready()?;
        let json = save_to_json_string(snapshot)?;
        self.storage.write(&key, &json)?;
        info!(slot, "game saved");
        Ok(())
    }

    pub fn load(&self, slot: usize) -> Option<SaveSnapshot> {
        match self.try_load(slot) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(slot, error = %format!("{error:#}"), "rejected save slot");
                None
            }
        }
    }

    fn try_load(&self, slot: usize) -> Result<Option<SaveSnapshot>> {
        let key = self.slot_key(slot)?;
        let Some(json) = self.storage.read(&key)? else {
            return Ok(None);
        };
        load_from_json_string(&json, self.top_score_cap).map(Some)
    }

    pub fn delete(&mut self, slot: usize) -> Result<()> {
        let key = self.slot_key(slot)?;
        self.ensure_ready()?;
        self.storage.remove(&key)?;
        info!(slot, "save slot deleted");
        Ok(())
    }

    /// One entry per slot; empty or unreadable slots are `None`.
    pub fn list_slots(&self) -> Vec<Option<SaveSlotMetadata>> {
        (0..self.max_slots)
            .map(|slot| {
                self.load(slot)
                    .map(|snapshot| SaveSlotMetadata::from_snapshot(slot, &snapshot))
            })
            .collect()
    }

    pub fn export(&self, slot: usize) -> Option<String> {
        let snapshot = self.load(slot)?;
        match export_to_base64(&snapshot) {
            Ok(encoded) => Some(encoded),
            Err(error) => {
                warn!(slot, error = %format!("{error:#}"), "failed to export save");
                None
            }
        }
    }

    /// Decodes and fully validates `encoded`, then stores it in `slot`.
    pub fn import(&mut self, slot: usize, encoded: &str) -> Option<SaveSnapshot> {
        let result = import_from_base64(encoded, self.top_score_cap)
            .and_then(|snapshot| self.save(slot, &snapshot).map(|()| snapshot));
        match result {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(slot, error = %format!("{error:#}"), "rejected imported save");
                None
            }
        }
    }
}
