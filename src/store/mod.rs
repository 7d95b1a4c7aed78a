//! This module provides the storage backends a [`ListService`] can persist its [`Catalog`] to.
//! Two stores are implemented: [`JsonFileStore`], which keeps the catalog in a single JSON
//! file, and [`MemoryStore`], which keeps it in memory and loses it when the process exits.
//!
//! [`ListService`]: ../struct.ListService.html
//! [`Catalog`]: ../struct.Catalog.html
use crate::{Catalog, Result};

/// A trait for reading and writing a whole [`Catalog`] at once.
///
/// Stores are only ever accessed while the service's lock is held, so implementations do
/// not need any synchronization of their own.
pub trait CatalogStore: Send + 'static {
    /// reads the full catalog.
    ///
    /// A store that has never been saved to returns an empty catalog.
    fn load(&mut self) -> Result<Catalog>;

    /// replaces the stored catalog with `catalog`
    fn save(&mut self, catalog: &Catalog) -> Result<()>;
}

mod file;
mod memory;

pub use self::file::{CorruptPolicy, JsonFileStore};
pub use self::memory::MemoryStore;
