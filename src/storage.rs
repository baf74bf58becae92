//! Key/value preferences. The `local` scope survives restarts as a JSON file;
//! the `session` scope lives only as long as the process.

use crate::error::Result;
use crate::logger;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Scopes {
    local: BTreeMap<String, String>,
    session: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: Option<PathBuf>,
    scopes: Arc<Mutex<Scopes>>,
}

impl LocalStore {
    /// Open the store backed by `path`. A missing or unreadable file starts
    /// empty.
    pub fn open(path: &Path) -> Self {
        let local = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                logger::warn(&format!("Ignoring corrupt storage file {:?}: {}", path, e));
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            scopes: Arc::new(Mutex::new(Scopes {
                local,
                session: BTreeMap::new(),
            })),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            scopes: Arc::new(Mutex::new(Scopes::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Scopes> {
        self.scopes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, local: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(local)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().local.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut scopes = self.lock();
        scopes.local.insert(key.to_string(), value.to_string());
        self.persist(&scopes.local)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut scopes = self.lock();
        if scopes.local.remove(key).is_some() {
            self.persist(&scopes.local)?;
        }
        Ok(())
    }

    pub fn session_get(&self, key: &str) -> Option<String> {
        self.lock().session.get(key).cloned()
    }

    pub fn session_set(&self, key: &str, value: &str) {
        self.lock()
            .session
            .insert(key.to_string(), value.to_string());
    }

    /// Empty both scopes and delete the backing file.
    pub fn clear_all(&self) -> Result<()> {
        let mut scopes = self.lock();
        scopes.local.clear();
        scopes.session.clear();
        if let Some(path) = &self.path
            && path.exists()
        {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = LocalStore::open(&path);
        store.set("stunotes-ui-theme", "light").unwrap();
        store.session_set("draft", "unsaved");

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get("stunotes-ui-theme").as_deref(), Some("light"));
        assert_eq!(reopened.session_get("draft"), None);
    }

    #[test]
    fn test_clear_all_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let store = LocalStore::open(&path);
        store.set("k", "v").unwrap();
        store.session_set("s", "v");
        assert!(path.exists());

        store.clear_all().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("k"), None);
        assert_eq!(store.session_get("s"), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(LocalStore::open(&path).get("anything"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = LocalStore::in_memory();
        let other = store.clone();
        other.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(other.get("k"), None);
    }
}
