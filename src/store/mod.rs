//! Entry store: the read-only, 1-based sequence of journal entries.

pub mod entry;

use std::fs;
use std::path::Path;

use crate::core::errors::{NavError, Result};

pub use entry::{EntryImage, JournalEntry};

/// Ordered, immutable collection of journal entries.
///
/// Storage order defines both the home-list order and the 1-based index used
/// by `Entry` routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: Vec<JournalEntry>,
}

impl EntryStore {
    /// Build a store, rejecting any entry with an empty field.
    pub fn new(entries: Vec<JournalEntry>) -> Result<Self> {
        for (offset, entry) in entries.iter().enumerate() {
            entry.validate(offset + 1)?;
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of entries (the payload the journal page fetches).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: Vec<JournalEntry> = serde_json::from_str(raw)?;
        Self::new(entries)
    }

    /// Load a JSON entries file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| NavError::io(path, source))?;
        Self::from_json_str(&raw)
    }

    /// Entry at 1-based `index`.
    pub fn get(&self, index: usize) -> Result<&JournalEntry> {
        index
            .checked_sub(1)
            .and_then(|offset| self.entries.get(offset))
            .ok_or(NavError::NotFound {
                index,
                size: self.entries.len(),
            })
    }

    /// Whether `index` is in `1..=size()`.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (1..=self.entries.len()).contains(&index)
    }

    /// Number of entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in storage order.
    #[must_use]
    pub fn all(&self) -> &[JournalEntry] {
        &self.entries
    }
}
