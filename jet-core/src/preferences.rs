use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persist::{read_json_with_tmp_fallback, write_json_atomic};

/// Snapshot of every stored boolean preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, bool>,
}

impl Preferences {
    pub fn get(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Key-value boolean store with a change stream.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    tx: Arc<watch::Sender<Preferences>>,
    write_lock: Arc<Mutex<()>>,
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn in_memory() -> Self {
        Self::with_initial(Preferences::default(), None)
    }

    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let initial: Preferences = match read_json_with_tmp_fallback(&path).await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => {
                debug!(path = %path.display(), "no preference store yet, starting empty");
                Preferences::default()
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "preference store unreadable, starting empty");
                Preferences::default()
            }
        };
        debug!(keys = initial.len(), path = %path.display(), "loaded preference store");
        Self::with_initial(initial, Some(path))
    }

    fn with_initial(initial: Preferences, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            write_lock: Arc::new(Mutex::new(())),
            path,
        }
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.tx.borrow().get(key)
    }

    /// Current preferences plus every later change.
    pub fn data(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }

    /// Writes one key. Observers are notified only after the value is persisted.
    pub async fn edit(&self, key: impl Into<String>, value: bool) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.tx.borrow().clone();
        next.values.insert(key.into(), value);
        match &self.path {
            Some(path) => write_json_atomic(path, &next).await?,
            None => debug!("preference store is in-memory only; skipping persist"),
        }
        self.tx.send_replace(next);
        Ok(())
    }
}
