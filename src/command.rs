use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::RlistError;

/// These are the remote procedures a client can call on a list server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// append a value to the tail of a list, creating the list if needed
    Append {
        /// the list to append to
        name: String,
        /// the value to append
        value: i64,
    },
    /// get the tail value of a list
    Get {
        /// the list to read
        name: String,
    },
    /// remove and return the tail value of a list
    Remove {
        /// the list to pop from
        name: String,
    },
    /// get the number of elements in a list
    Size {
        /// the list to measure
        name: String,
    },
    /// get the names of all lists
    ListNames,
}

/// The response returned for any [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// the request was successful
    Ok(Reply),
    /// the request failed
    Err(Fault),
}

/// The result of a successful [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// reply to `Append`
    Appended(bool),
    /// reply to `Get` and `Remove`
    Value(i64),
    /// reply to `Size`
    Size(u64),
    /// reply to `ListNames`
    Names(BTreeSet<String>),
}

/// Why a [`Request`] failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// the named list was never created
    NotFound(String),
    /// the named list has no elements
    EmptyList(String),
    /// the server could not read or write its catalog
    Persistence(String),
    /// any other server side failure
    Internal(String),
}

impl From<RlistError> for Fault {
    fn from(e: RlistError) -> Self {
        match e {
            RlistError::NotFound(name) => Fault::NotFound(name),
            RlistError::EmptyList(name) => Fault::EmptyList(name),
            e @ RlistError::Corrupt { .. } | e @ RlistError::Io(_) => {
                Fault::Persistence(e.to_string())
            }
            e => Fault::Internal(e.to_string()),
        }
    }
}

impl From<Fault> for RlistError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::NotFound(name) => RlistError::NotFound(name),
            Fault::EmptyList(name) => RlistError::EmptyList(name),
            Fault::Persistence(msg) => RlistError::Persistence(msg),
            Fault::Internal(msg) => RlistError::Server(msg),
        }
    }
}
