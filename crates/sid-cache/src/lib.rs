//! # sid-cache
//!
//! Persistent cache of generated function source, keyed by
//! [`GenerationKey`].
//!
//! ## Lifecycle
//!
//! 1. **Construct** with [`CacheStore::new`] (no I/O).
//! 2. **Load** once at startup with [`CacheStore::load`]. A missing file is an
//!    empty cache; a malformed file is logged and treated as empty.
//! 3. **Insert** on every miss. Each insertion writes the whole table back to
//!    disk (write-through). Write failures are logged and dropped.
//!
//! There is no eviction and no expiry.
//!
//! ## File format
//!
//! A JSON object whose keys are encoded generation keys and whose values are
//! the generated source text:
//!
//! ```json
//! {
//!   "[\"adder\",\"add two numbers\"]": "fn adder(a: i64, b: i64) -> i64 { a + b }"
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sid_core::{GenerationKey, KeyError};
use tracing::{debug, error};

/// Write-through cache of generated source.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: HashMap<GenerationKey, String>,
}

impl CacheStore {
    /// Create an empty cache backed by `path`. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    /// Create a cache backed by `path` and load it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        store.load();
        store
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached source for `key`, if any. An empty string is a cached failure.
    pub fn get(&self, key: &GenerationKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store `code` under `key` and persist the table immediately.
    pub fn insert(&mut self, key: GenerationKey, code: String) {
        self.entries.insert(key, code);
        self.save();
    }

    /// Load the table from disk, falling back to empty on any failure.
    pub fn load(&mut self) {
        match self.try_load() {
            Ok(count) => debug!("Loaded {} cached functions from {}", count, self.path.display()),
            Err(e) => {
                error!("Failed to load cache: {}", e);
                self.entries.clear();
            }
        }
    }

    /// Load the table from disk.
    ///
    /// A missing file yields an empty table. On error the in-memory table is
    /// left unchanged.
    pub fn try_load(&mut self) -> Result<usize, CacheError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.entries.clear();
                return Ok(0);
            }
            Err(e) => return Err(CacheError::Io(e)),
        };

        let raw: serde_json::Map<String, Value> = serde_json::from_str(&text)?;
        let mut entries = HashMap::with_capacity(raw.len());

        for (encoded, value) in raw {
            let key = GenerationKey::decode(&encoded)?;
            let code = match value {
                Value::String(code) => code,
                _ => return Err(CacheError::InvalidValue(encoded)),
            };
            entries.insert(key, code);
        }

        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Persist the table, logging and dropping any failure.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            error!("Failed to save cache: {}", e);
        }
    }

    /// Persist the table.
    ///
    /// Keys are written in sorted order. The file is replaced atomically.
    pub fn try_save(&self) -> Result<(), CacheError> {
        let table: BTreeMap<String, &str> = self
            .entries
            .iter()
            .map(|(key, code)| (key.encode(), code.as_str()))
            .collect();
        let json = serde_json::to_string_pretty(&table)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path).map_err(|e| CacheError::Io(e.error))?;

        Ok(())
    }
}

/// Cache persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Value for key {0} is not a string")]
    InvalidValue(String),
}
