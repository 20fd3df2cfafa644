// src/registration.rs

//! Persisted set of event ids the user registered for.
//!
//! Backed by a small JSON file. The store is loaded once at open and kept
//! in memory; every toggle writes the file back. A missing or corrupt
//! file means an empty store; storage problems are logged, never
//! surfaced.

use std::fs;
use std::path::PathBuf;

/// File-backed registration id store.
#[derive(Debug)]
pub struct RegistrationStore {
    path: PathBuf,
    ids: Vec<String>,
}

impl RegistrationStore {
    /// Open the store at `path`, treating missing or unreadable content as
    /// an empty id list.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ids = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(ids) => ids,
                Err(e) => {
                    log::warn!("Registration store at {:?} is corrupt: {}. Resetting.", path, e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!("Cannot read registration store at {:?}: {}", path, e);
                Vec::new()
            }
        };
        Self { path, ids }
    }

    /// Whether `id` is currently registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Flip the registration state of `id` and persist. Returns the new
    /// state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let registered = match self.ids.iter().position(|known| known == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id.to_string());
                true
            }
        };
        self.save();
        registered
    }

    /// All registered ids, in registration order.
    pub fn all(&self) -> &[String] {
        &self.ids
    }

    /// Write the id list atomically (temp file, then rename).
    fn save(&self) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let bytes = serde_json::to_vec(&self.ids)?;
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, bytes)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        })();

        if let Err(e) = result {
            log::warn!("Cannot persist registration store at {:?}: {}", self.path, e);
        }
    }
}
