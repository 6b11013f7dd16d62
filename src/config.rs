//! Configuration management
//!
//! Persists the session state (token, saved channels and the last used
//! channel) to `~/.config/dcli/config.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::Result;
use crate::error::Error;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "DCLI_CONFIG_DIR";

const CONFIG_FILE: &str = "config.json";

/// On-disk configuration record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Bot token sent verbatim in the `Authorization` header
    #[serde(default)]
    pub token: String,

    /// Saved channels, display name to channel ID
    #[serde(default)]
    pub channels: BTreeMap<String, String>,

    /// Channel selected when the last session was saved.
    /// Older records lack this field.
    #[serde(default)]
    pub last_used_channel: String,
}

/// File-backed store for [`ConfigRecord`]
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the store location from the environment.
    ///
    /// Uses `$DCLI_CONFIG_DIR` when set, otherwise `~/.config/dcli`.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(Self::new(dir));
        }

        let home = dirs::home_dir().ok_or(Error::HomeDirMissing)?;
        Ok(Self::new(home.join(".config").join("dcli")))
    }

    /// Get the config directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the config file path
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<ConfigRecord> {
        let path = self.path();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigMissing(path));
            }
            Err(e) => return Err(e.into()),
        };

        let record: ConfigRecord = serde_json::from_str(&content)
            .map_err(|source| Error::ConfigCorrupt { path: path.clone(), source })?;

        debug!("Loaded config from {:?} ({} channels)", path, record.channels.len());
        Ok(record)
    }

    /// Save configuration to file.
    ///
    /// The directory is created owner-only and the file is left readable
    /// by its owner alone, since it holds the token.
    pub fn save(&self, record: &ConfigRecord) -> Result<()> {
        let path = self.path();
        let persist_err = |e: std::io::Error| Error::Persistence(format!("{:?}: {}", path, e));

        create_private_dir(&self.dir).map_err(persist_err)?;

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        write_private_file(&path, content.as_bytes()).map_err(persist_err)?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Truncate-and-rewrite a file readable by its owner only.
///
/// New files are created with mode 0600; an existing file is tightened
/// to 0600 as well.
fn write_private_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content)?;
    file.flush()
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ConfigRecord {
        let mut channels = BTreeMap::new();
        channels.insert("general".to_string(), "C1".to_string());
        channels.insert("random".to_string(), "C2".to_string());
        ConfigRecord {
            token: "T1".to_string(),
            channels,
            last_used_channel: "C2".to_string(),
        }
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("dcli"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_load_missing() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());

        assert!(matches!(store.load(), Err(Error::ConfigMissing(_))));
    }

    #[test]
    fn test_load_corrupt() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        std::fs::write(store.path(), "T1\nC1\n").unwrap();

        assert!(matches!(store.load(), Err(Error::ConfigCorrupt { .. })));
    }

    #[test]
    fn test_last_used_defaults_to_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        std::fs::write(store.path(), r#"{"token": "T1", "channels": {"general": "C1"}}"#).unwrap();

        let record = store.load().unwrap();
        assert_eq!(record.token, "T1");
        assert_eq!(record.channels.get("general").map(String::as_str), Some("C1"));
        assert!(record.last_used_channel.is_empty());
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());

        store.save(&sample()).unwrap();
        let smaller = ConfigRecord {
            token: "T2".to_string(),
            ..ConfigRecord::default()
        };
        store.save(&smaller).unwrap();

        assert_eq!(store.load().unwrap(), smaller);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path().join("nested").join("dcli"));
        store.save(&sample()).unwrap();

        let file_mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);

        let dir_mode = std::fs::metadata(store.dir()).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::new(tmp.path());
        std::fs::write(store.path(), "{}").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&sample()).unwrap();

        let file_mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_save_into_unwritable_location_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = ConfigStore::new(blocker.join("dcli"));

        assert!(matches!(store.save(&sample()), Err(Error::Persistence(_))));
    }
}
