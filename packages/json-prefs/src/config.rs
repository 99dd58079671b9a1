//! Configuration for file-backed stores.

use std::path::PathBuf;

use prefstore_core::{Error, Result};

/// What to do when a preference file exists but cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorruptionPolicy {
    /// Fail `open` with [`Error::Corrupt`].
    #[default]
    Fail,
    /// Log a warning and start from an empty snapshot. The broken file is
    /// overwritten by the next committed edit.
    ResetToEmpty,
}

/// Where a [`JsonFilePrefStore`](crate::JsonFilePrefStore) keeps its file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the preference file. Created on open.
    pub directory: PathBuf,
    /// Store name; the file is `<name>.preferences.json`.
    pub name: String,
    pub corruption: CorruptionPolicy,
}

impl StoreConfig {
    pub const DEFAULT_NAME: &'static str = "PreferencesStore";
    pub const FILE_SUFFIX: &'static str = ".preferences.json";

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            name: Self::DEFAULT_NAME.to_string(),
            corruption: CorruptionPolicy::default(),
        }
    }

    /// Per-user configuration directory for an application,
    /// e.g. `~/.config/<app>` on Linux.
    pub fn for_app(app: &str) -> Result<Self> {
        if app.is_empty() {
            return Err(Error::InvalidConfig {
                message: "application name must not be empty".to_string(),
            });
        }
        let base = dirs::config_dir().ok_or_else(|| Error::InvalidConfig {
            message: "no configuration directory for this platform".to_string(),
        })?;
        Ok(Self::new(base.join(app)))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.corruption = policy;
        self
    }

    /// Full path of the preference file.
    pub fn file_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}", self.name, Self::FILE_SUFFIX))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig {
                message: "store name must not be empty".to_string(),
            });
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(Error::InvalidConfig {
                message: format!("store name {:?} must be a plain file name", self.name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_uses_name_and_suffix() {
        let config = StoreConfig::new("/data/app").with_name("settings");
        assert_eq!(
            config.file_path(),
            PathBuf::from("/data/app/settings.preferences.json")
        );
    }

    #[test]
    fn defaults() {
        let config = StoreConfig::new("/data/app");
        assert_eq!(config.name, StoreConfig::DEFAULT_NAME);
        assert_eq!(config.corruption, CorruptionPolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["", "a/b", "..", "c\\d"] {
            let config = StoreConfig::new("/data/app").with_name(name);
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfig { .. })),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn for_app_rejects_empty_name() {
        assert!(StoreConfig::for_app("").is_err());
    }
}
