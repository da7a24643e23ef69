//! The channel the user is looking at, persisted across sessions.
//!
//! The selection is loaded once when a [`ChannelSelection`] is created and written back on
//! every change. Where it lives is up to the [`KeyValueStore`] implementation.

use eyre::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CHANNEL_ID_KEY: &str = "youtube_dashboard_channel_id";
const CHANNEL_NAME_KEY: &str = "youtube_dashboard_channel_name";

/// A string-to-string store that survives reloads.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> eyre::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> eyre::Result<()>;
}

/// Volatile store, mostly useful for tests and one-off sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> eyre::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> eyre::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole file is read on open and rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is treated as an empty store.
    pub fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };
        Ok(Self { path, entries })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> eyre::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> eyre::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&self.entries).context("serialize store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write {}", self.path.display()))
    }
}

/// The currently selected channel.
#[derive(Debug)]
pub struct ChannelSelection<S> {
    store: S,
    channel_id: String,
    channel_name: String,
}

impl<S: KeyValueStore> ChannelSelection<S> {
    /// Loads the persisted selection, falling back to `initial_channel_id` if none was saved.
    pub fn load(store: S, initial_channel_id: &str) -> eyre::Result<Self> {
        let channel_id = store
            .get(CHANNEL_ID_KEY)
            .context("load selected channel id")?
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| initial_channel_id.to_string());
        let channel_name = store
            .get(CHANNEL_NAME_KEY)
            .context("load selected channel name")?
            .unwrap_or_default();
        Ok(Self {
            store,
            channel_id,
            channel_name,
        })
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn set_channel_id(&mut self, channel_id: impl Into<String>) -> eyre::Result<()> {
        self.channel_id = channel_id.into();
        self.store
            .set(CHANNEL_ID_KEY, &self.channel_id)
            .context("save selected channel id")
    }

    pub fn set_channel_name(&mut self, channel_name: impl Into<String>) -> eyre::Result<()> {
        self.channel_name = channel_name.into();
        self.store
            .set(CHANNEL_NAME_KEY, &self.channel_name)
            .context("save selected channel name")
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn falls_back_to_initial_channel() {
        let selection = ChannelSelection::load(MemoryStore::default(), "UCdefault").unwrap();
        assert_eq!(selection.channel_id(), "UCdefault");
        assert_eq!(selection.channel_name(), "");
    }

    #[test]
    fn changes_are_saved_and_reloaded() {
        let mut selection = ChannelSelection::load(MemoryStore::default(), "UCdefault").unwrap();
        selection.set_channel_id("UCother").unwrap();
        selection.set_channel_name("Other Channel").unwrap();

        let store = selection.into_store();
        let selection = ChannelSelection::load(store, "UCdefault").unwrap();
        assert_eq!(selection.channel_id(), "UCother");
        assert_eq!(selection.channel_name(), "Other Channel");
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");

        let store = JsonFileStore::open(&path).unwrap();
        let mut selection = ChannelSelection::load(store, "UCdefault").unwrap();
        assert_eq!(selection.channel_id(), "UCdefault");
        selection.set_channel_id("UCsaved").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            store.get(CHANNEL_ID_KEY).unwrap().as_deref(),
            Some("UCsaved")
        );
        let selection = ChannelSelection::load(store, "UCdefault").unwrap();
        assert_eq!(selection.channel_id(), "UCsaved");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
    }
}
