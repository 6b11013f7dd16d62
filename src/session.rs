//! Session state for one interactive run.

use crate::channels::ChannelRegistry;
use crate::config::{ConfigRecord, ConfigStore};
use crate::error::Error;
use crate::Result;

/// Mutable state shared by the bootstrapper and the command dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub channels: ChannelRegistry,
    pub current_channel_id: String,
    pub last_used_channel_id: String,
}

impl Session {
    /// Build a session from a persisted record.
    ///
    /// The current channel starts at the last used one.
    pub fn from_record(record: ConfigRecord) -> Self {
        Self {
            token: record.token,
            channels: record.channels.into(),
            current_channel_id: record.last_used_channel.clone(),
            last_used_channel_id: record.last_used_channel,
        }
    }

    /// Snapshot of the persistent fields.
    pub fn to_record(&self) -> ConfigRecord {
        ConfigRecord {
            token: self.token.clone(),
            channels: self.channels.clone().into(),
            last_used_channel: self.last_used_channel_id.clone(),
        }
    }

    /// Display name of the current channel, if it is saved.
    pub fn current_channel_name(&self) -> Option<&str> {
        self.channels.resolve_name(&self.current_channel_id)
    }

    /// One line per saved channel in presentation order, the current one starred.
    pub fn channel_listing(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|(name, id)| {
                let marker = if id == self.current_channel_id { " *" } else { "" };
                format!("{} ({}){}", name, id, marker)
            })
            .collect()
    }

    /// Make the entry at `index` (1-based) current and persist it.
    ///
    /// If the write fails the previous selection is restored.
    pub fn switch_to(&mut self, index: usize, store: &ConfigStore) -> Result<(String, String)> {
        let (name, id) = self.channels.select(index)?;
        let (name, id) = (name.to_string(), id.to_string());

        let previous = (
            std::mem::replace(&mut self.current_channel_id, id.clone()),
            std::mem::replace(&mut self.last_used_channel_id, id.clone()),
        );

        if let Err(e) = store.save(&self.to_record()) {
            self.current_channel_id = previous.0;
            self.last_used_channel_id = previous.1;
            return Err(e);
        }

        Ok((name, id))
    }

    /// Save a channel under `name` and persist it.
    ///
    /// The first channel ever saved also becomes the current one, as does
    /// a new ID given to the name that held the current channel.
    pub fn add_channel(&mut self, name: &str, id: &str, store: &ConfigStore) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyInput("Channel name".to_string()));
        }
        if id.is_empty() {
            return Err(Error::EmptyInput("Channel ID".to_string()));
        }

        let before = self.clone();
        self.channels.add(name, id);
        if !self.channels.contains_id(&self.current_channel_id) {
            self.current_channel_id = id.to_string();
            self.last_used_channel_id = id.to_string();
        }

        self.commit(store, before)
    }

    /// Remove the entry at `index` (1-based) and persist the result.
    ///
    /// Removing the current channel moves the selection to the first
    /// remaining entry, or clears it when none are left.
    pub fn remove_channel(&mut self, index: usize, store: &ConfigStore) -> Result<(String, String)> {
        let before = self.clone();
        let removed = self.channels.remove(index)?;

        if !self.channels.contains_id(&self.current_channel_id) {
            let fallback = self
                .channels
                .iter()
                .next()
                .map(|(_, id)| id.to_string())
                .unwrap_or_default();
            self.current_channel_id = fallback.clone();
            self.last_used_channel_id = fallback;
        }

        self.commit(store, before)?;
        Ok(removed)
    }

    fn commit(&mut self, store: &ConfigStore, before: Session) -> Result<()> {
        if let Err(e) = store.save(&self.to_record()) {
            *self = before;
            return Err(e);
        }
        Ok(())
    }
}
