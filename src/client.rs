use std::collections::BTreeSet;
use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::Deserializer;
use tracing::{debug, warn};

use crate::command::{Reply, Request, Response};
use crate::{Result, RlistError};

/// `ListClient` contains the functionality for calling the remote procedures of a
/// [`ListServer`] over a single connection.
///
/// Any error for which [`RlistError::is_transport`] is true means the connection is unusable;
/// the caller decides whether to establish a new one, e.g. with [`ListClient::connect_with_retry`].
///
/// [`ListServer`]: ./struct.ListServer.html
pub struct ListClient {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl ListClient {
    /// creates a client and establishes a socket connection to the server at the given `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(ListClient {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// connects to `addr`, retrying failed attempts as directed by `policy`.
    ///
    /// # Errors
    /// returns the error of the last attempt once `policy` is exhausted
    pub fn connect_with_retry(addr: SocketAddr, policy: &ReconnectPolicy) -> Result<Self> {
        let mut delays = policy.delays();
        let mut attempt = 1;
        loop {
            match ListClient::connect(addr) {
                Ok(client) => return Ok(client),
                Err(e) => match delays.next() {
                    Some(delay) => {
                        warn!(
                            "connecting to {} failed (attempt {}): {}, retrying in {:?}",
                            addr, attempt, e, delay
                        );
                        thread::sleep(delay);
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// appends `value` to list `name`, creating the list if needed
    pub fn append(&mut self, name: &str, value: i64) -> Result<bool> {
        let req = Request::Append {
            name: name.to_owned(),
            value,
        };
        match self.call(req)? {
            Reply::Appended(ok) => Ok(ok),
            other => Err(unexpected(other)),
        }
    }

    /// gets the tail value of list `name`
    /// # Errors
    /// `RlistError::NotFound` or `RlistError::EmptyList` as reported by the server
    pub fn get(&mut self, name: &str) -> Result<i64> {
        match self.call(Request::Get {
            name: name.to_owned(),
        })? {
            Reply::Value(value) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// removes and returns the tail value of list `name`
    /// # Errors
    /// `RlistError::NotFound` or `RlistError::EmptyList` as reported by the server
    pub fn remove(&mut self, name: &str) -> Result<i64> {
        match self.call(Request::Remove {
            name: name.to_owned(),
        })? {
            Reply::Value(value) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// gets the number of elements in list `name`
    /// # Errors
    /// `RlistError::NotFound` if the list was never created
    pub fn size(&mut self, name: &str) -> Result<u64> {
        match self.call(Request::Size {
            name: name.to_owned(),
        })? {
            Reply::Size(size) => Ok(size),
            other => Err(unexpected(other)),
        }
    }

    /// gets the names of every list on the server
    pub fn list_names(&mut self) -> Result<BTreeSet<String>> {
        match self.call(Request::ListNames)? {
            Reply::Names(names) => Ok(names),
            other => Err(unexpected(other)),
        }
    }

    /// sends `req` and blocks until its response arrives
    fn call(&mut self, req: Request) -> Result<Reply> {
        debug!("sending request: {:?}", req);
        serde_json::to_writer(&mut self.writer, &req)?;
        self.writer.flush()?;

        match Response::deserialize(&mut self.reader)? {
            Response::Ok(reply) => Ok(reply),
            Response::Err(fault) => Err(fault.into()), // re-throwing the server's error here
        }
    }
}

fn unexpected(reply: Reply) -> RlistError {
    RlistError::Server(format!("unexpected reply: {:?}", reply))
}

/// How hard [`ListClient::connect_with_retry`] tries before giving up.
///
/// The first retry waits `initial_backoff`; every later one waits twice as long as the one
/// before, up to `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// total number of connection attempts, the first one included. `0` behaves like `1`.
    pub max_attempts: u32,
    /// delay before the first retry
    pub initial_backoff: Duration,
    /// upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl ReconnectPolicy {
    /// a policy that makes a single attempt and never retries
    pub fn no_retry() -> Self {
        ReconnectPolicy {
            max_attempts: 1,
            ..ReconnectPolicy::default()
        }
    }

    /// the delays to wait between consecutive attempts; there are `max_attempts - 1` of them
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let max_backoff = self.max_backoff;
        let retries = self.max_attempts.saturating_sub(1) as usize;
        std::iter::successors(Some(self.initial_backoff.min(max_backoff)), move |prev| {
            Some(prev.saturating_mul(2).min(max_backoff))
        })
        .take(retries)
    }
}
