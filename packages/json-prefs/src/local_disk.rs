//! JSON-file preference store.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lazy_static::lazy_static;
use tokio::sync::watch;

use prefstore_core::{Error, PrefStore, Preferences, PreferencesChannel, Result, Transform};

use crate::config::{CorruptionPolicy, StoreConfig};
use crate::format;

lazy_static! {
    // Files currently held by a JsonFilePrefStore in this process.
    static ref OPEN_FILES: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

/// Exclusive claim on a preference file, released on drop.
struct FileClaim {
    path: PathBuf,
}

impl FileClaim {
    fn acquire(path: PathBuf) -> Result<Self> {
        let mut open = OPEN_FILES
            .lock()
            .map_err(|_| Error::other("open file registry poisoned"))?;
        if !open.insert(path.clone()) {
            return Err(Error::AlreadyOpen { path });
        }
        Ok(Self { path })
    }
}

impl Drop for FileClaim {
    fn drop(&mut self) {
        if let Ok(mut open) = OPEN_FILES.lock() {
            open.remove(&self.path);
        }
    }
}

/// A preference store persisted as one JSON file.
///
/// Every committed edit rewrites the whole file: the new document is written
/// to a temporary file in the same directory, synced, and renamed over the
/// old one, so readers of the file never see a partial write.
///
/// Only one `JsonFilePrefStore` may hold a given file within a process;
/// opening it a second time fails with [`Error::AlreadyOpen`] until the first
/// store is dropped.
pub struct JsonFilePrefStore {
    path: PathBuf,
    channel: PreferencesChannel,
    _claim: FileClaim,
}

impl JsonFilePrefStore {
    /// Open (or create) the store described by `config`.
    pub fn open(config: &StoreConfig) -> Result<JsonFilePrefStore> {
        config.validate()?;

        fs::create_dir_all(&config.directory)?;
        let directory = config.directory.canonicalize()?;
        let path = directory.join(
            config
                .file_path()
                .file_name()
                .ok_or_else(|| Error::InvalidConfig {
                    message: "store file has no name".to_string(),
                })?,
        );

        let claim = FileClaim::acquire(path.clone())?;
        let initial = Self::load(&path, config.corruption)?;
        tracing::debug!(
            path = %path.display(),
            entries = initial.len(),
            "opened preference file"
        );

        Ok(JsonFilePrefStore {
            path,
            channel: PreferencesChannel::new(initial),
            _claim: claim,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path, policy: CorruptionPolicy) -> Result<Preferences> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Preferences::new()),
            Err(e) => return Err(e.into()),
        };

        match format::decode(&text) {
            Ok(prefs) => Ok(prefs),
            Err(err) => match policy {
                CorruptionPolicy::Fail => Err(Error::Corrupt {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }),
                CorruptionPolicy::ResetToEmpty => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "preference file is corrupt, starting empty"
                    );
                    Ok(Preferences::new())
                }
            },
        }
    }

    fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
        let directory = path.parent().ok_or_else(|| Error::InvalidConfig {
            message: format!("{} has no parent directory", path.display()),
        })?;

        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl PrefStore for JsonFilePrefStore {
    fn data(&self) -> watch::Receiver<Arc<Preferences>> {
        self.channel.subscribe()
    }

    fn snapshot(&self) -> Arc<Preferences> {
        self.channel.current()
    }

    async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>> {
        let path = self.path.clone();
        self.channel
            .apply(transform, move |next| async move {
                let contents = format::encode(&next)?;
                tracing::debug!(path = %path.display(), entries = next.len(), "writing preference file");
                tokio::task::spawn_blocking(move || {
                    Self::write_atomically(&path, contents.as_bytes())
                })
                .await
                .map_err(|e| Error::other(format!("preference writer task failed: {}", e)))?
            })
            .await
    }
}
