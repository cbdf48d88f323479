//! Flat key=value store
//!
//! The store is a line-oriented text file shared with the management
//! interface. Comment and blank lines survive a rewrite untouched, data lines
//! are replaced in place, and new keys are appended at the end.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Prefix for the temporary file written next to the store before the rename
const TEMP_PREFIX: &str = "tmp_traffic_store_";

/// Errors raised while loading or persisting a store file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read store {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write temporary store next to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace store {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },

    #[error("store {} already exists", path.display())]
    AlreadyExists { path: PathBuf },
}

/// Insertion-ordered string map
///
/// Re-inserting an existing key updates its value but keeps its original
/// position, so iteration follows the order keys were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl StoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A decoded store: the raw lines plus the data they carry
#[derive(Debug, Clone, Default)]
pub struct Store {
    lines: Vec<String>,
    values: StoreMap,
}

impl Store {
    /// Decode store text. Never fails; lines that are not `key = value` are
    /// kept for the rewrite but carry no data.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let mut values = StoreMap::new();

        for line in &lines {
            if let Some((key, value)) = parse_data_line(line) {
                values.insert(key, unquote(value));
            }
        }

        Self { lines, values }
    }

    /// Read and decode the store at `path`
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Self::parse(&text))
    }

    /// The original line sequence, as read
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn values(&self) -> &StoreMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key)
    }

    /// Look up a per-road field as `field.index`, falling back to bare `field`
    pub fn road_field(&self, field: &str, index: i64) -> Option<&str> {
        self.values
            .get(&format!("{field}.{index}"))
            .or_else(|| self.values.get(field))
    }

    /// Re-encode the original lines with `updates` applied
    ///
    /// Data lines whose key is in `updates` become `key = value`; every other
    /// line is copied verbatim. Keys the original never had are appended in
    /// `updates` order.
    pub fn render(&self, updates: &StoreMap) -> String {
        let mut out = String::new();
        let mut seen = HashSet::new();

        for line in &self.lines {
            match parse_data_line(line) {
                Some((key, _)) => {
                    seen.insert(key);
                    match updates.get(key) {
                        Some(value) => out.push_str(&format!("{key} = {value}")),
                        None => out.push_str(line),
                    }
                }
                None => out.push_str(line),
            }
            out.push('\n');
        }

        for (key, value) in updates.iter() {
            if !seen.contains(key) {
                out.push_str(&format!("{key} = {value}\n"));
            }
        }

        out
    }

    /// Render with `updates` and atomically replace the file at `path`
    pub fn save(&self, path: &Path, updates: &StoreMap) -> Result<(), StoreError> {
        backup(path);
        atomic_write(path, self.render(updates).as_bytes())
    }
}

/// Split a data line into trimmed key and raw value
///
/// Returns `None` for blank lines, comments and lines without `=`.
fn parse_data_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Strip one layer of matching single or double quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Path of the `.bak` sibling, e.g. `TRAFFIC_MIB.txt.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Best-effort copy of the current store to its `.bak` sibling
fn backup(path: &Path) {
    let bak = backup_path(path);
    match fs::copy(path, &bak) {
        Ok(_) => debug!("Backed up {} to {}", path.display(), bak.display()),
        Err(e) => warn!("Could not back up {}: {}", path.display(), e),
    }
}

/// Write `data` next to `path` and rename it into place
///
/// The temporary file lives in the same directory so the rename never crosses
/// filesystems. If anything fails before the rename the temporary file is
/// removed and `path` is left as it was.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    write_temp(path, data)?
        .persist(path)
        .map_err(|e| StoreError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

/// Like [`atomic_write`], but fails with [`StoreError::AlreadyExists`]
/// instead of replacing a file that is already at `path`
///
/// The existence check and the rename are one filesystem operation, so a
/// file created concurrently is never overwritten.
pub fn atomic_create(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    write_temp(path, data)?
        .persist_noclobber(path)
        .map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => StoreError::Persist {
                path: path.to_path_buf(),
                source: e.error,
            },
        })?;
    Ok(())
}

/// Synced temporary file holding `data`, in the same directory as `path`
fn write_temp(path: &Path, data: &[u8]) -> Result<NamedTempFile, StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(data).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    Ok(tmp)
}
