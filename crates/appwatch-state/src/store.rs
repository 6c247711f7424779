//! ApplicationStore — redb-backed application directory.
//!
//! Records are JSON-serialized into redb's `&[u8]` value column under
//! their `{namespace}/{name}` key. The store supports both on-disk and
//! in-memory backends (the latter for testing and replay).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::APPLICATIONS;
use crate::types::{ApplicationRecord, ReconcileKey};

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Read access to the authoritative application records.
///
/// `Ok(None)` means the application does not exist; `Err` means the
/// lookup itself failed. Implementations must be cheap to call from
/// many threads at once.
pub trait ApplicationDirectory: Send + Sync {
    fn get(&self, namespace: &str, name: &str) -> StateResult<Option<ApplicationRecord>>;
}

/// Thread-safe application store backed by redb.
#[derive(Clone)]
pub struct ApplicationStore {
    db: Arc<Database>,
}

impl ApplicationStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "application store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store.
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory application store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(APPLICATIONS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or update an application record.
    pub fn put_application(&self, record: &ApplicationRecord) -> StateResult<()> {
        let key = record.table_key();
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(APPLICATIONS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, submission_id = %record.submission_id, "application stored");
        Ok(())
    }

    /// Get an application by its `{namespace}/{name}` key.
    pub fn get_application(&self, key: &str) -> StateResult<Option<ApplicationRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(APPLICATIONS).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: ApplicationRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List all applications.
    pub fn list_applications(&self) -> StateResult<Vec<ApplicationRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(APPLICATIONS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: ApplicationRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(record);
        }
        Ok(results)
    }
}

impl ApplicationDirectory for ApplicationStore {
    fn get(&self, namespace: &str, name: &str) -> StateResult<Option<ApplicationRecord>> {
        let key = ReconcileKey::new(namespace, name);
        self.get_application(&key.to_string())
    }
}
