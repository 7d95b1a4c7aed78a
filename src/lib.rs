#![deny(missing_docs)]
//! A multithreaded server of remote, named, persistent integer lists.
//!
//! This crate provides the [`ListService`] that owns the lists, a [`ListServer`] and
//! [`ListClient`] that speak to each other over TCP, as well as an [`rlist-client`] and
//! [`rlist-server`] executable that can be used to interact with the service.
//!
//! ## Supported Operations
//! Every list is a stack of `i64`s identified by its name. Five operations are supported:
//!
//! - `APPEND` a value to the tail of a list, creating the list on first use
//! - `GET` the tail value of a list
//! - `REMOVE` the tail value of a list, returning it
//! - `SIZE` of a list
//! - `LIST NAMES` of every list that was ever created
//!
//! `GET` and `REMOVE` fail with [`RlistError::NotFound`] for a list that was never created and
//! with [`RlistError::EmptyList`] for one that has been drained. `SIZE` only fails for the former.
//! Lists are never deleted.
//!
//! ## ListService
//! [`ListService`] is the brains of this entire operation. It owns a [`CatalogStore`] behind
//! one mutex, and every operation:
//! - takes the mutex, whichever list it touches and whether or not it writes
//! - loads the complete [`Catalog`] from the store
//! - computes its result, saving the catalog back if it changed
//! - releases the mutex
//!
//! Nothing is cached between operations; the store is the only source of truth. This makes
//! every operation a little transaction, and serializes all of them.
//!
//! ## Stores
//! [`JsonFileStore`] keeps the catalog in a single JSON file (`data.json` by default) that maps
//! each list name to a `{"name": ..., "items": [...]}` object. A missing file is an empty
//! catalog; a file that can't be decoded is an error unless [`CorruptPolicy::Discard`] is
//! chosen. Saves rewrite the whole file through a temp file and a rename.
//! [`MemoryStore`] keeps the catalog in memory only.
//!
//! ## Client / Server
//! Client and server logic is contained in the [`ListClient`] and [`ListServer`] structs.
//! The server hands every accepted connection to a [`thread_pool::ThreadPool`]; the handler
//! then answers requests on that connection one at a time until the client goes away.
//!
//! ## Protocol
//! A [`Request`] is encoded as a JSON value and written to the socket; the server answers
//! each with exactly one JSON encoded [`Response`], either `Ok` with a [`Reply`] or `Err` with
//! a [`Fault`]. Values follow one another on the stream with no extra framing.
//!
//! ### Client / Server executables
//! `rlist-server` runs a server, `rlist-client` calls a single procedure, or starts an
//! interactive menu with `rlist-client shell`.
//!
//! [`rlist-server`]: ./rlist-server.rs
//! [`rlist-client`]: ./rlist-client.rs

pub use catalog::{Catalog, List};
pub use client::{ListClient, ReconnectPolicy};
pub use command::{Fault, Reply, Request, Response};
pub use error::{Result, RlistError};
pub use server::ListServer;
pub use service::ListService;
pub use store::{CatalogStore, CorruptPolicy, JsonFileStore, MemoryStore};

mod catalog;
mod client;
mod command;
mod error;
mod server;
mod service;
pub mod store;
pub mod thread_pool;
