//! Persistent key-value state
//!
//! State is grouped into named buckets of keys, each holding a JSON value.
//! The file-backed store keeps the whole document in one JSON file and takes
//! an exclusive advisory lock around every read-modify-write.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use fs4::fs_std::FileExt;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::debug;

/// Bucket holding config bootstrap state
pub const CONFIG_STATE_BUCKET: &str = "configState";

/// Key of the config template fingerprint record inside [`CONFIG_STATE_BUCKET`]
pub const CONFIG_STATE_KEY: &str = "configState";

/// Bucketed key-value store
pub trait PersistentState {
    /// Read a value, `None` if the bucket or key is absent
    fn get(&self, bucket: &str, key: &str) -> Result<Option<Value>>;

    /// Set a value, replacing any previous one
    fn set(&self, bucket: &str, key: &str, value: Value) -> Result<()>;

    /// Delete a value; deleting an absent key is not an error
    fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}

/// Persistent state stored as a single JSON document
#[derive(Debug, Clone)]
pub struct JsonFileState {
    path: Utf8PathBuf,
}

impl JsonFileState {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn state_error(&self, message: impl Into<String>) -> Error {
        Error::state(self.path.as_str(), message)
    }

    fn read_document(&self, file: &mut File) -> Result<Map<String, Value>> {
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(self.state_error("state document is not a JSON object")),
        }
    }

    /// Run `f` on the locked document and write it back if `f` returns true
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>) -> bool,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        // Released when `file` is dropped
        file.lock_exclusive()
            .map_err(|e| self.state_error(format!("failed to lock state file: {e}")))?;

        let mut document = self.read_document(&mut file)?;
        if !f(&mut document) {
            return Ok(());
        }

        let serialized = serde_json::to_string_pretty(&Value::Object(document))?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

impl PersistentState for JsonFileState {
    fn get(&self, bucket: &str, key: &str) -> Result<Option<Value>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        file.lock_shared()
            .map_err(|e| self.state_error(format!("failed to lock state file: {e}")))?;

        let document = self.read_document(&mut file)?;
        Ok(document
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned())
    }

    fn set(&self, bucket: &str, key: &str, value: Value) -> Result<()> {
        debug!("Setting state {}/{}", bucket, key);
        self.update(|document| {
            let entry = document
                .entry(bucket.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(bucket_map) = entry {
                bucket_map.insert(key.to_string(), value);
            }
            true
        })
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        debug!("Deleting state {}/{}", bucket, key);
        self.update(|document| {
            let Some(Value::Object(bucket_map)) = document.get_mut(bucket) else {
                return false;
            };
            if bucket_map.remove(key).is_none() {
                return false;
            }
            if bucket_map.is_empty() {
                document.remove(bucket);
            }
            true
        })
    }
}
