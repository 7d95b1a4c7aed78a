//! this binary starts the list server
//! to see the list of options, type: `rlist-server --help`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

use clap::{arg_enum, crate_version, value_t, App, Arg, ArgMatches};
use rlist::thread_pool::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use rlist::{
    CatalogStore, CorruptPolicy, JsonFileStore, ListServer, ListService, MemoryStore, Result,
    RlistError,
};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Store {
        json,
        memory
    }
}

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Pool {
        naive,
        queue,
        rayon
    }
}

const DEFAULT_ADDRESS: &str = "127.0.0.1:1234";
const DEFAULT_DATA_FILE: &str = "data.json";
const DEFAULT_THREADS: &str = "4";
const DEFAULT_LOG_LEVEL: &str = "info";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    data: PathBuf,
    store: Store,
    pool: Pool,
    threads: u32,
    on_corrupt: CorruptPolicy,
}

impl Opt {
    /// validates the raw command line values
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`RlistError::Parsing`] if one of the parameters is invalid
    ///
    fn build(matches: &ArgMatches) -> Result<Opt> {
        let addr = matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS);
        let addr: SocketAddr = addr.parse().map_err(|_| {
            RlistError::Parsing(format!("could not parse {} into an IP address and port", addr))
        })?;

        let threads = matches.value_of("threads").unwrap_or(DEFAULT_THREADS);
        let threads: u32 = threads.parse().map_err(|_| {
            RlistError::Parsing(format!("could not parse {} into a thread count", threads))
        })?;

        let store = value_t!(matches, "store", Store)
            .map_err(|e| RlistError::Parsing(e.message))?;
        let pool = value_t!(matches, "pool", Pool).map_err(|e| RlistError::Parsing(e.message))?;

        if pool != Pool::naive && threads == 0 {
            return Err(RlistError::Parsing(format!(
                "the {} pool needs at least one thread",
                pool
            )));
        }

        let on_corrupt = if matches.is_present("discard-corrupt") {
            CorruptPolicy::Discard
        } else {
            CorruptPolicy::Fail
        };

        Ok(Opt {
            addr,
            data: PathBuf::from(matches.value_of("data").unwrap_or(DEFAULT_DATA_FILE)),
            store,
            pool,
            threads,
            on_corrupt,
        })
    }
}

fn main() {
    let matches = App::new("rlist-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("serves named, persistent integer lists over TCP")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("data")
            .long("data")
            .value_name("FILE")
            .help("sets the JSON file the lists are kept in")
            .default_value(DEFAULT_DATA_FILE))
        .arg(Arg::with_name("store")
            .long("store")
            .value_name("STORE")
            .help("where lists are kept, either 'json' (the --data file) or 'memory'")
            .possible_values(&Store::variants())
            .default_value("json"))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("how connections are run: 'naive' (a thread each), 'queue' or 'rayon' (--threads workers)")
            .possible_values(&Pool::variants())
            .default_value("naive"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("number of worker threads for the 'queue' and 'rayon' pools")
            .default_value(DEFAULT_THREADS))
        .arg(Arg::with_name("discard-corrupt")
            .long("discard-corrupt")
            .help("start from an empty catalog instead of failing when the data file is corrupt"))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the most verbose level that is logged: error, warn, info, debug or trace")
            .default_value(DEFAULT_LOG_LEVEL))
        .get_matches();

    // set up a tracing subscriber to log to STDERR
    let level = matches
        .value_of("log-level")
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .parse::<Level>()
        .unwrap_or(Level::INFO);
    subscriber_config(level);

    let opt = match Opt::build(&matches) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("rlist-server {}", env!("CARGO_PKG_VERSION"));
    info!("Storage: {}", opt.store);
    info!("Thread pool: {} ({} threads)", opt.pool, opt.threads);

    match opt.store {
        Store::json => {
            info!("Data file: {:?}", opt.data);
            if opt.on_corrupt == CorruptPolicy::Discard {
                warn!("a corrupt data file will be discarded");
            }
            let mut store =
                JsonFileStore::open(opt.data.clone()).with_corrupt_policy(opt.on_corrupt);
            // refuse to start on a corrupt file rather than failing every request
            let catalog = store.load()?;
            info!("Data file holds {} lists", catalog.len());
            run_with_store(store, &opt)
        }
        Store::memory => run_with_store(MemoryStore::new(), &opt),
    }
}

fn run_with_store<S: CatalogStore>(store: S, opt: &Opt) -> Result<()> {
    let service = ListService::new(store);
    match opt.pool {
        Pool::naive => ListServer::new(service, NaiveThreadPool::new(opt.threads)?).run(opt.addr),
        Pool::queue => {
            ListServer::new(service, SharedQueueThreadPool::new(opt.threads)?).run(opt.addr)
        }
        Pool::rayon => ListServer::new(service, RayonThreadPool::new(opt.threads)?).run(opt.addr),
    }
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: Level) {
    let subscriber = FmtSubscriber::builder()
        // all spans/events at `level` or more severe will be written
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
