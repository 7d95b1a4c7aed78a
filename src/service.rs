use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::store::CatalogStore;
use crate::{Catalog, Result};

/// The list service: the authoritative owner of every named list.
///
/// A `ListService` owns a [`CatalogStore`] behind a single mutex. Every operation, on any
/// list and of any kind (reads included), takes that mutex, loads the catalog from the store,
/// computes its result, saves the catalog back if it changed, and only then releases the
/// mutex. Operations are therefore totally ordered, and each one starts from exactly the
/// state the previous one persisted.
///
/// Cloning a `ListService` is cheap and yields a handle to the same store and lock, which is
/// how each connection handler of a [`ListServer`] gets access to it.
///
/// [`ListServer`]: ./struct.ListServer.html
pub struct ListService<S: CatalogStore> {
    store: Arc<Mutex<S>>,
}

impl<S: CatalogStore> Clone for ListService<S> {
    fn clone(&self) -> Self {
        ListService {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore> ListService<S> {
    /// creates a service that persists its lists in `store`
    pub fn new(store: S) -> Self {
        ListService {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// appends `value` to the tail of list `name`, creating the list if needed.
    ///
    /// Returns `true` once the new state has been persisted.
    pub fn append(&self, name: &str, value: i64) -> Result<bool> {
        self.write(|catalog| {
            catalog.append(name, value);
            Ok(())
        })?;
        info!("appended {} to list {}", value, name);
        Ok(true)
    }

    /// returns the tail element of list `name` without removing it
    ///
    /// # Errors
    /// `RlistError::NotFound` if the list was never created,
    /// `RlistError::EmptyList` if it has no elements
    pub fn get(&self, name: &str) -> Result<i64> {
        let value = self.read(|catalog| catalog.last(name))?;
        info!("last value of list {}: {}", name, value);
        Ok(value)
    }

    /// removes and returns the tail element of list `name`
    ///
    /// # Errors
    /// same as [`ListService::get`]. Nothing is persisted when the call fails.
    pub fn remove(&self, name: &str) -> Result<i64> {
        let value = self.write(|catalog| catalog.pop(name))?;
        info!("removed {} from list {}", value, name);
        Ok(value)
    }

    /// returns the number of elements in list `name`
    ///
    /// # Errors
    /// `RlistError::NotFound` if the list was never created
    pub fn size(&self, name: &str) -> Result<usize> {
        let size = self.read(|catalog| catalog.size(name))?;
        info!("size of list {}: {}", name, size);
        Ok(size)
    }

    /// returns the names of every list ever created
    pub fn list_names(&self) -> Result<BTreeSet<String>> {
        let names = self.read(|catalog| Ok(catalog.names()))?;
        info!("lists available: {:?}", names);
        Ok(names)
    }

    /// runs `op` against a freshly loaded catalog without saving it
    fn read<T>(&self, op: impl FnOnce(&Catalog) -> Result<T>) -> Result<T> {
        let mut store = self.lock();
        let catalog = store.load()?;
        op(&catalog)
    }

    /// runs `op` against a freshly loaded catalog and saves it if `op` succeeded
    fn write<T>(&self, op: impl FnOnce(&mut Catalog) -> Result<T>) -> Result<T> {
        let mut store = self.lock();
        let mut catalog = store.load()?;
        let out = op(&mut catalog)?;
        store.save(&catalog)?;
        Ok(out)
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // the catalog is reloaded by every operation, so a panic in another holder can't
        // have left stale state behind
        self.store.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            debug!("recovering poisoned list service lock");
            poisoned.into_inner()
        })
    }
}
