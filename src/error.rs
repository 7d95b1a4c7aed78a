use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// type alias for all operations on a [`ListService`] (and friends) that could fail with an
/// [`RlistError`]
///
/// [`ListService`]: ./struct.ListService.html
pub type Result<T> = std::result::Result<T, RlistError>;

/// The Error variants used throughout the crate.
/// Lower level errors from third party crates are wrapped by the `Io` and `Serde` variants.
#[derive(Error, Debug)]
pub enum RlistError {
    /// the referenced list was never created
    #[error("list `{0}` does not exist")]
    NotFound(String),

    /// the referenced list exists but has no elements
    #[error("list `{0}` is empty")]
    EmptyList(String),

    /// the catalog file exists but its contents could not be decoded
    #[error("catalog file {path:?} is corrupt: {source}")]
    Corrupt {
        /// path of the catalog file
        path: PathBuf,
        /// the decoding error
        #[source]
        source: serde_json::Error,
    },

    /// variant for errors caused from file or socket IO
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// errors while encoding/decoding JSON on the wire
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// a command line option or other input could not be parsed
    #[error("{0}")]
    Parsing(String),

    /// the server could not read or write its catalog file
    #[error("server persistence failure: {0}")]
    Persistence(String),

    /// the server failed for a reason not covered by the other variants
    #[error("server error: {0}")]
    Server(String),

    /// a thread pool could not be built
    #[error("thread pool error: {0}")]
    Pool(String),
}

impl RlistError {
    /// returns `true` if this error means the connection to the server is unusable
    /// (refused, reset, or closed part way through a response) and a new one must be
    /// established before retrying
    pub fn is_transport(&self) -> bool {
        match self {
            RlistError::Io(_) => true,
            RlistError::Serde(e) => e.is_io() || e.is_eof(),
            _ => false,
        }
    }
}
