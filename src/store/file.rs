use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, instrument, warn};

use super::CatalogStore;
use crate::{Catalog, Result, RlistError};

/// What a [`JsonFileStore`] does when the catalog file exists but cannot be decoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// fail the operation with `RlistError::Corrupt`. The file is left untouched.
    Fail,
    /// log the error and carry on with an empty catalog. The corrupt file is overwritten by
    /// the next successful save, so its contents are lost.
    Discard,
}

impl Default for CorruptPolicy {
    fn default() -> Self {
        CorruptPolicy::Fail
    }
}

/// A [`CatalogStore`] that keeps the whole catalog in a single JSON file.
///
/// Every [`save`] rewrites the entire file. The new contents are written to a sibling
/// `<file>.tmp`, synced, and then renamed over the catalog file, so a crash part way through
/// a save leaves the previous catalog in place.
///
/// [`save`]: ./trait.CatalogStore.html#tymethod.save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    on_corrupt: CorruptPolicy,
}

impl JsonFileStore {
    /// creates a store over the catalog file at `path`. The file does not need to exist yet;
    /// it (and any missing parent directories) will be created by the first save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            on_corrupt: CorruptPolicy::default(),
        }
    }

    /// sets what happens when the catalog file cannot be decoded
    pub fn with_corrupt_policy(mut self, on_corrupt: CorruptPolicy) -> Self {
        self.on_corrupt = on_corrupt;
        self
    }

    /// the path of the catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl CatalogStore for JsonFileStore {
    #[instrument(skip(self), fields(path = ?self.path))]
    fn load(&mut self) -> Result<Catalog> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no catalog file yet, starting empty");
                return Ok(Catalog::new());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!("catalog file is empty, starting empty");
            return Ok(Catalog::new());
        }

        match serde_json::from_slice::<Catalog>(&bytes) {
            Ok(mut catalog) => {
                catalog.normalize_names();
                debug!(lists = catalog.len(), "loaded catalog");
                Ok(catalog)
            }
            Err(source) => match self.on_corrupt {
                CorruptPolicy::Fail => Err(RlistError::Corrupt {
                    path: self.path.clone(),
                    source,
                }),
                CorruptPolicy::Discard => {
                    error!("discarding corrupt catalog file: {}", source);
                    Ok(Catalog::new())
                }
            },
        }
    }

    #[instrument(skip(self, catalog), fields(path = ?self.path))]
    fn save(&mut self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, catalog) {
            // best effort, the rename never happened so the catalog file is intact
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &self.path)?;

        debug!(lists = catalog.len(), "saved catalog");
        Ok(())
    }
}

/// serializes `catalog` into a freshly truncated file at `path` and syncs it to disk
fn write_synced(path: &Path, catalog: &Catalog) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, catalog)?;
    writer.flush()?;

    let file: File = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(())
}
