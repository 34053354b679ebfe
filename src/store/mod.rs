//! Durable string key-value storage shared by every service.
//!
//! Implementations never report failures to the caller. Errors are logged and
//! the operation degrades to a no-op (for writes) or `None` (for reads), so
//! services can read and write without their own error handling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Well-known keys of the persisted values.
pub mod keys {
    pub const WALLET_BALANCE: &str = "nigerianWallet";
    pub const PAYMENT_HISTORY: &str = "paymentHistory";
    pub const CART_ITEMS: &str = "cartItems";
    pub const USER_ORDERS: &str = "userOrders";
    pub const FAVORITE_RESTAURANTS: &str = "favoriteRestaurants";
    pub const USER_ROLE: &str = "userRole";
    pub const USER: &str = "user";
}

/// String-keyed, string-valued storage that must never fail loudly.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Reads a JSON value. Absent keys and malformed JSON both read as `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw)
        .map_err(|e| warn!(key, error = %e, "Discarding malformed stored value"))
        .ok()
}

pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => warn!(key, error = %e, "Failed to encode value for storage"),
    }
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!(key, error = %e, "Memory store unavailable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
            }
            Err(e) => warn!(key, error = %e, "Memory store unavailable"),
        }
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// A JSON object on disk holding every key.
///
/// `set` only updates memory and wakes a writer thread, which rewrites the
/// file with the latest snapshot. Bursts of writes collapse into one. Dropping
/// the store waits for the last write to land.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<Mutex<HashMap<String, String>>>,
    dirty: Option<mpsc::Sender<()>>,
    writer: Option<JoinHandle<()>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing, unreadable or malformed file
    /// opens as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Store file is malformed, starting empty");
                HashMap::new()
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Store file not readable, starting empty");
                HashMap::new()
            }
        };
        let entries = Arc::new(Mutex::new(entries));

        let (dirty, wakeups) = mpsc::channel();
        let writer = {
            let path = path.clone();
            let entries = entries.clone();
            thread::Builder::new()
                .name("store-writer".to_string())
                .spawn(move || write_behind(&path, &entries, &wakeups))
        };
        let (dirty, writer) = match writer {
            Ok(handle) => (Some(dirty), Some(handle)),
            Err(e) => {
                warn!(error = %e, "No writer thread, store writes will block");
                (None, None)
            }
        };

        Self { path, entries, dirty, writer }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writer thread body. Runs until the store is dropped.
fn write_behind(path: &Path, entries: &Mutex<HashMap<String, String>>, wakeups: &mpsc::Receiver<()>) {
    while wakeups.recv().is_ok() {
        while wakeups.try_recv().is_ok() {}
        write_snapshot(path, entries);
    }
}

fn write_snapshot(path: &Path, entries: &Mutex<HashMap<String, String>>) {
    let snapshot = match entries.lock() {
        Ok(entries) => entries.clone(),
        Err(e) => {
            warn!(error = %e, "File store unavailable");
            return;
        }
    };
    if let Err(e) = write_file(path, &snapshot) {
        warn!(path = %path.display(), error = %e, "Failed to persist store");
    }
}

fn write_file(path: &Path, entries: &HashMap<String, String>) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;
    let staging = path.with_extension("tmp");
    fs::write(&staging, raw).map_err(|e| e.to_string())?;
    fs::rename(&staging, path).map_err(|e| e.to_string())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!(key, error = %e, "File store unavailable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
            }
            Err(e) => {
                warn!(key, error = %e, "File store unavailable");
                return;
            }
        }

        let queued = self.dirty.as_ref().is_some_and(|dirty| dirty.send(()).is_ok());
        if !queued {
            write_snapshot(&self.path, &self.entries);
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        self.dirty.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                warn!(path = %self.path.display(), "Store writer panicked");
            }
        }
    }
}
