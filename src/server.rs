use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use serde_json::Deserializer;
use tracing::{debug, error, info};

use crate::command::{Reply, Request, Response};
use crate::store::CatalogStore;
use crate::thread_pool::ThreadPool;
use crate::{ListService, Result};

/// A TCP socket server over a [`ListService`].
/// It accepts connections on a [`SocketAddr`](https://doc.rust-lang.org/std/net/enum.SocketAddr.html)
/// and hands each one to its [`ThreadPool`]. The connection's handler then reads [`Request`]s
/// off the socket, one after another, until the client hangs up.
///
/// Every handler holds a clone of the same [`ListService`], whose lock is what keeps
/// concurrent connections from interfering with one another.
///
/// # Example
/// Create and run a server listening on "127.0.0.1:1234" that starts a new thread for every
/// connection and keeps its lists in `data.json`
/// ```rust
/// use rlist::{JsonFileStore, ListServer, ListService};
/// use rlist::thread_pool::{NaiveThreadPool, ThreadPool};
/// # fn main() -> rlist::Result<()> {
/// let service = ListService::new(JsonFileStore::open("data.json"));
/// let server = ListServer::new(service, NaiveThreadPool::new(0)?);
/// //server.run("127.0.0.1:1234")?;
/// # Ok(())
/// # }
/// ```
///
/// [`Request`]: ./enum.Request.html
pub struct ListServer<S: CatalogStore, P: ThreadPool> {
    service: ListService<S>,
    pool: P,
}

impl<S: CatalogStore, P: ThreadPool> ListServer<S, P> {
    /// Create a new `ListServer` over `service`, running connection handlers on `pool`
    pub fn new(service: ListService<S>, pool: P) -> Self {
        ListServer { service, pool }
    }

    /// binds to `addr` and serves connections until the listener fails.
    ///
    /// # Errors
    /// returns [`RlistError::Io`] if the address could not be bound
    ///
    /// [`RlistError::Io`]: ./enum.RlistError.html
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve(listener)
    }

    /// serves connections arriving on an already bound `listener`.
    ///
    /// Failing to accept one connection is logged and does not stop the server.
    pub fn serve(self, listener: TcpListener) -> Result<()> {
        info!("listening on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let service = self.service.clone();
                    self.pool.spawn(move || {
                        if let Err(e) = handle(service, stream) {
                            error!("Error on serving client: {}", e);
                        }
                    });
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Reads [`Request`]s off the `tcp` stream, runs each against the `service`, and writes the
/// [`Response`] back before reading the next one
///
/// [`Request`]: ./enum.Request.html
/// [`Response`]: ./enum.Response.html
fn handle<S: CatalogStore>(service: ListService<S>, tcp: TcpStream) -> Result<()> {
    let peer_addr: SocketAddr = tcp.peer_addr()?;
    info!("client connected: {}", peer_addr);

    let requests = Deserializer::from_reader(BufReader::new(&tcp)).into_iter::<Request>();
    let mut writer = BufWriter::new(&tcp);

    for req in requests {
        let req = req?;
        debug!("Receive request from {}: {:?}", peer_addr, req);

        let resp = dispatch(&service, req);
        serde_json::to_writer(&mut writer, &resp)?;
        writer.flush()?;
        debug!("Response sent to {}: {:?}", peer_addr, resp);
    }

    info!("client disconnected: {}", peer_addr);
    Ok(())
}

/// runs a single request against the service and turns the outcome into a [`Response`]
fn dispatch<S: CatalogStore>(service: &ListService<S>, req: Request) -> Response {
    let outcome = match req {
        Request::Append { name, value } => service.append(&name, value).map(Reply::Appended),
        Request::Get { name } => service.get(&name).map(Reply::Value),
        Request::Remove { name } => service.remove(&name).map(Reply::Value),
        Request::Size { name } => service.size(&name).map(|n| Reply::Size(n as u64)),
        Request::ListNames => service.list_names().map(Reply::Names),
    };

    match outcome {
        Ok(reply) => Response::Ok(reply),
        Err(e) => {
            debug!("request failed: {}", e);
            Response::Err(e.into())
        }
    }
}
