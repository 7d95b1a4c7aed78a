use tracing::debug;

use super::CatalogStore;
use crate::{Catalog, Result};

/// A [`CatalogStore`] that keeps the catalog in memory.
///
/// Nothing survives a restart. Useful for tests and throwaway servers.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    catalog: Catalog,
}

impl MemoryStore {
    /// creates an empty in-memory store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// creates a store that starts out holding `catalog`
    pub fn with_catalog(catalog: Catalog) -> Self {
        MemoryStore { catalog }
    }
}

impl CatalogStore for MemoryStore {
    fn load(&mut self) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }

    fn save(&mut self, catalog: &Catalog) -> Result<()> {
        debug!(lists = catalog.len(), "saving catalog in memory");
        self.catalog = catalog.clone();
        Ok(())
    }
}
