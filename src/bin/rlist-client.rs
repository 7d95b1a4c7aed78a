//! The rlist-client executable supports the following command line arguments:
//!
//! `rlist-client append <NAME> <VALUE> [--addr IP-PORT]`
//!
//!     Append an integer to the tail of a list, creating the list if needed.
//!
//! `rlist-client get <NAME> [--addr IP-PORT]`
//!
//!     Print the tail value of a list.
//!
//! `rlist-client rm <NAME> [--addr IP-PORT]`
//!
//!     Remove the tail value of a list and print it.
//!
//! `rlist-client size <NAME> [--addr IP-PORT]`
//!
//!     Print the number of values in a list.
//!
//! `rlist-client ls [--addr IP-PORT]`
//!
//!     Print the name of every list, one per line.
//!
//! `rlist-client shell [--addr IP-PORT]`
//!
//!     Start an interactive menu. If the connection to the server is lost, the menu offers
//!     to reconnect and then retries the interrupted operation.
//!
//! --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//! If --addr is not specified then connect on 127.0.0.1:1234. --retries sets how many times
//! a failed connection attempt is retried, with exponential backoff.
//! A missing or empty list, a server error, or an unparsable IP-PORT prints an error and
//! returns a non-zero exit code.
//!
//! `rlist-client -V`
//!
//!     Print the version.

use std::io::{self, BufRead, Lines, StdinLock, Write};
use std::net::SocketAddr;
use std::process::exit;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use rlist::{ListClient, ReconnectPolicy, Request, Result, RlistError};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:1234";
const DEFAULT_RETRIES: &str = "0";

/// what the client was asked to do
#[derive(Debug)]
enum Action {
    Call(Request),
    Shell,
}

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    policy: ReconnectPolicy,
    action: Action,
}

fn main() {
    // configure a subscriber that will log warnings (e.g. connection retries) to STDERR
    subscriber_config();

    let name_arg = || Arg::with_name("NAME").required(true).index(1);
    let addr_arg = || {
        Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .default_value(DEFAULT_ADDRESS)
    };
    let retries_arg = || {
        Arg::with_name("retries")
            .long("retries")
            .value_name("N")
            .help("number of times a failed connection attempt is retried")
            .default_value(DEFAULT_RETRIES)
    };
    let matches = App::new("rlist-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("calls a remote list server")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(
            vec![
                SubCommand::with_name("append")
                    .about("Append an integer to the tail of a list")
                    .setting(AppSettings::AllowNegativeNumbers)
                    .arg(name_arg())
                    .arg(Arg::with_name("VALUE").required(true).index(2)),
                SubCommand::with_name("get")
                    .about("Print the last value of a list")
                    .arg(name_arg()),
                SubCommand::with_name("rm")
                    .about("Remove and print the last value of a list")
                    .arg(name_arg()),
                SubCommand::with_name("size")
                    .about("Print the number of values in a list")
                    .arg(name_arg()),
                SubCommand::with_name("ls").about("Print the names of all lists"),
                SubCommand::with_name("shell").about("Start an interactive menu"),
            ]
            .into_iter()
            .map(|cmd| cmd.arg(addr_arg()).arg(retries_arg())),
        )
        .get_matches();

    let result = parse_options(&matches).and_then(run);
    if let Err(e) = result {
        eprintln!("{}", e);
        exit(1);
    }
}

/// runs the requested action against the server at `opt.addr`
fn run(opt: Opt) -> Result<()> {
    match opt.action {
        Action::Call(req) => {
            let mut client = ListClient::connect_with_retry(opt.addr, &opt.policy)?;
            println!("{}", execute(&mut client, &req)?);
            Ok(())
        }
        Action::Shell => shell(opt.addr, &opt.policy),
    }
}

/// performs `req` on the server and renders the reply for printing
fn execute(client: &mut ListClient, req: &Request) -> Result<String> {
    let out = match req {
        Request::Append { name, value } => {
            if client.append(name, *value)? {
                format!("appended {} to {}", value, name)
            } else {
                format!("could not append {} to {}", value, name)
            }
        }
        Request::Get { name } => client.get(name)?.to_string(),
        Request::Remove { name } => client.remove(name)?.to_string(),
        Request::Size { name } => client.size(name)?.to_string(),
        Request::ListNames => client
            .list_names()?
            .into_iter()
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(out)
}

/// the interactive menu. Operations interrupted by a lost connection are retried once the
/// user has chosen to reconnect.
fn shell(addr: SocketAddr, policy: &ReconnectPolicy) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    let mut client = match ListClient::connect_with_retry(addr, policy) {
        Ok(client) => Some(client),
        Err(e) => {
            println!("could not connect to {}: {}", addr, e);
            None
        }
    };
    let mut pending: Option<Request> = None;

    loop {
        let mut conn = match client.take() {
            Some(conn) => conn,
            None => match reconnect(addr, policy, &mut input)? {
                Some(conn) => conn,
                None => return Ok(()),
            },
        };

        let req = match pending.take() {
            Some(req) => req,
            None => match read_request(&mut input)? {
                Some(req) => req,
                None => {
                    println!("bye");
                    return Ok(());
                }
            },
        };

        match execute(&mut conn, &req) {
            Ok(out) => {
                println!("{}", out);
                client = Some(conn);
            }
            Err(e) if e.is_transport() => {
                println!("lost connection to the server: {}", e);
                pending = Some(req);
            }
            Err(e) => {
                println!("error: {}", e);
                client = Some(conn);
            }
        }
    }
}

/// asks whether to reconnect until the user says yes and a connection is made (`Some`), or
/// says no (`None`)
fn reconnect(
    addr: SocketAddr,
    policy: &ReconnectPolicy,
    input: &mut Lines<StdinLock>,
) -> Result<Option<ListClient>> {
    loop {
        let answer = match prompt(input, "reconnect to the server? (y/n): ")? {
            Some(answer) => answer,
            None => return Ok(None),
        };
        match answer.as_str() {
            "y" | "Y" => match ListClient::connect_with_retry(addr, policy) {
                Ok(client) => {
                    println!("reconnected to {}", addr);
                    return Ok(Some(client));
                }
                Err(e) => println!("could not reconnect: {}", e),
            },
            "n" | "N" => return Ok(None),
            _ => println!("please answer 'y' or 'n'"),
        }
    }
}

/// shows the menu until a valid choice is made. `None` means exit.
fn read_request(input: &mut Lines<StdinLock>) -> Result<Option<Request>> {
    loop {
        println!("Menu:");
        println!("1 - Append a value to a list");
        println!("2 - Get the last value of a list");
        println!("3 - Remove the last value of a list");
        println!("4 - Get the size of a list");
        println!("5 - List all lists");
        println!("6 - Exit");
        let choice = match prompt(input, "choose an option: ")? {
            Some(choice) => choice,
            None => return Ok(None),
        };

        let req = match choice.as_str() {
            "1" => {
                let name = match prompt(input, "list name: ")? {
                    Some(name) => name,
                    None => return Ok(None),
                };
                let value = match prompt(input, "value to append: ")? {
                    Some(value) => value,
                    None => return Ok(None),
                };
                match value.parse::<i64>() {
                    Ok(value) => Request::Append { name, value },
                    Err(_) => {
                        println!("invalid value, try again");
                        continue;
                    }
                }
            }
            "2" | "3" | "4" => {
                let name = match prompt(input, "list name: ")? {
                    Some(name) => name,
                    None => return Ok(None),
                };
                match choice.as_str() {
                    "2" => Request::Get { name },
                    "3" => Request::Remove { name },
                    _ => Request::Size { name },
                }
            }
            "5" => Request::ListNames,
            "6" => return Ok(None),
            _ => {
                println!("invalid option, try again");
                continue;
            }
        };
        return Ok(Some(req));
    }
}

/// prints `msg` and reads one trimmed line; `None` at end of input
fn prompt(input: &mut Lines<StdinLock>, msg: &str) -> Result<Option<String>> {
    print!("{}", msg);
    io::stdout().flush()?;
    match input.next() {
        Some(line) => Ok(Some(line?.trim().to_owned())),
        None => Ok(None),
    }
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let (cmd, args) = match matches.subcommand() {
        (cmd, Some(args)) => (cmd, args),
        (cmd, None) => {
            return Err(RlistError::Parsing(format!("unknown command: {}", cmd)));
        }
    };

    let addr = args.value_of("addr").unwrap_or(DEFAULT_ADDRESS);
    let addr: SocketAddr = addr.parse().map_err(|_| {
        RlistError::Parsing(format!("could not parse {} into an IP address and port", addr))
    })?;

    let retries = args.value_of("retries").unwrap_or(DEFAULT_RETRIES);
    let retries: u32 = retries.parse().map_err(|_| {
        RlistError::Parsing(format!("could not parse {} into a retry count", retries))
    })?;
    let policy = ReconnectPolicy {
        max_attempts: retries.saturating_add(1),
        ..ReconnectPolicy::default()
    };

    let name = || args.value_of("NAME").unwrap_or_default().to_owned();
    let action = match cmd {
        "append" => {
            let value = args.value_of("VALUE").unwrap_or_default();
            let value: i64 = value.parse().map_err(|_| {
                RlistError::Parsing(format!("could not parse {} into an integer", value))
            })?;
            Action::Call(Request::Append {
                name: name(),
                value,
            })
        }
        "get" => Action::Call(Request::Get { name: name() }),
        "rm" => Action::Call(Request::Remove { name: name() }),
        "size" => Action::Call(Request::Size { name: name() }),
        "ls" => Action::Call(Request::ListNames),
        "shell" => Action::Shell,
        _ => return Err(RlistError::Parsing(format!("unknown command: {}", cmd))),
    };

    Ok(Opt {
        addr,
        policy,
        action,
    })
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
