//! Channel registry: saved channel names and their platform IDs.
//!
//! Entries are presented sorted by name. Every listing and every 1-based
//! selection uses that order, so a number shown to the user always maps
//! back to the entry printed next to it.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::Result;

/// Mapping of display name to channel ID.
///
/// Two names may point at the same ID; IDs are opaque and not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelRegistry {
    entries: BTreeMap<String, String>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a channel, replacing the ID of an existing entry with the same name.
    pub fn add(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.entries.insert(name.into(), id.into());
    }

    /// Remove the entry shown at `index` (1-based) and return it.
    pub fn remove(&mut self, index: usize) -> Result<(String, String)> {
        let name = self.select(index)?.0.to_string();
        let id = self
            .entries
            .remove(&name)
            .ok_or_else(|| Error::InvalidSelection(index.to_string()))?;
        Ok((name, id))
    }

    /// Look up the entry shown at `index` (1-based).
    pub fn select(&self, index: usize) -> Result<(&str, &str)> {
        if index == 0 || index > self.entries.len() {
            return Err(Error::InvalidSelection(format!(
                "{} is not between 1 and {}",
                index,
                self.entries.len()
            )));
        }

        self.iter()
            .nth(index - 1)
            .ok_or_else(|| Error::InvalidSelection(index.to_string()))
    }

    /// Entries in presentation order; position `i` is shown as `i + 1`.
    pub fn list_for_presentation(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }

    /// Name of the first entry whose ID equals `id`.
    pub fn resolve_name(&self, id: &str) -> Option<&str> {
        self.iter()
            .find(|(_, entry_id)| *entry_id == id)
            .map(|(name, _)| name)
    }

    /// Get the ID saved under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.values().any(|entry_id| entry_id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, id)` pairs in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id.as_str()))
    }
}

impl From<BTreeMap<String, String>> for ChannelRegistry {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl From<ChannelRegistry> for BTreeMap<String, String> {
    fn from(registry: ChannelRegistry) -> Self {
        registry.entries
    }
}
