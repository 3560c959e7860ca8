//! Flat key/value storage backends for the persisted settings.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use super::SettingValue;
use crate::common::utils::private_path;

/// Durable storage of independent scalar settings.
///
/// Each key is persisted on its own: a `set` makes that one key durable before
/// returning and leaves every other key untouched.
pub trait KeyValueStore: Send {
    /// Read a key. `Ok(None)` means the key has never been written.
    fn get(&self, key: &str) -> Result<Option<SettingValue>>;

    /// Write one key durably.
    fn set(&mut self, key: &str, value: SettingValue) -> Result<()>;
}

/// Settings kept as top-level keys of a TOML file.
///
/// Every operation re-reads the file, so edits made by another process (or by
/// hand) between two writes are preserved. Writes go to a temporary file in
/// the same directory which is then renamed over the original.
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the file, `Ok(None)` when it does not exist yet.
    fn read_table(&self) -> Result<Option<toml::Table>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", private_path(&self.path)))?;
        let table = content
            .parse::<toml::Table>()
            .with_context(|| format!("Failed to parse {} as TOML", private_path(&self.path)))?;
        Ok(Some(table))
    }

    fn write_table(&self, table: &toml::Table) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("Settings path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", private_path(dir)))?;

        let content = toml::to_string(table).context("Failed to serialize settings")?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", private_path(dir)))?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write {}", private_path(&self.path)))?;
        Ok(())
    }
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        let Some(table) = self.read_table()? else {
            return Ok(None);
        };

        match table.get(key) {
            None => Ok(None),
            Some(toml::Value::Boolean(value)) => Ok(Some(SettingValue::Bool(*value))),
            Some(toml::Value::Integer(value)) => Ok(Some(SettingValue::Int(*value))),
            Some(other) => anyhow::bail!("unsupported {} value for '{key}'", other.type_str()),
        }
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        // An unparseable file is reported instead of being replaced
        let mut table = self.read_table()?.unwrap_or_default();

        let stored = match value {
            SettingValue::Bool(v) => toml::Value::Boolean(v),
            SettingValue::Int(v) => toml::Value::Integer(v),
        };
        table.insert(key.to_string(), stored);

        self.write_table(&table)
    }
}

/// Process-local store, shared between clones.
///
/// Useful for embedding the scheduler without touching the filesystem and
/// for inspecting what was written in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, SettingValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for seeding a store.
    pub fn with(self, key: &str, value: SettingValue) -> Self {
        self.lock().insert(key.to_string(), value);
        self
    }

    /// Current contents.
    pub fn snapshot(&self) -> HashMap<String, SettingValue> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SettingValue>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        Ok(self.lock().get(key).copied())
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}
