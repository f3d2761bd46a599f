//! The interactive lookup tool.
//!
//! Reads commands from standard input and answers them with the library's
//! [`Resolver`]. All resolution output goes to standard output; command
//! errors and the log go to standard error.

use dnsdelve::base::{Node, Query, RecordType, ResourceRecord};
use dnsdelve::resolver::{
    Config, QueryLog, Resolver, TraceSink, DNS_PORT,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::str::FromStr;
use tokio::runtime;

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let root = match (args.next(), args.next()) {
        (Some(root), None) => root,
        _ => {
            eprintln!("Invalid call. Usage:");
            eprintln!("\tdnsdelve rootServer");
            eprintln!(
                "where rootServer is the IP address (in dotted form) of \
                 the root DNS server to start the search at."
            );
            return ExitCode::FAILURE;
        }
    };
    let root = match IpAddr::from_str(&root) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("Invalid root server ({err}).");
            return ExitCode::FAILURE;
        }
    };
    println!("Root DNS server is: {root}");

    let runtime = match runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Cannot start the runtime ({err}).");
            return ExitCode::FAILURE;
        }
    };
    let config = Config::new(SocketAddr::new(root, DNS_PORT));
    let mut resolver = match runtime.block_on(Resolver::bind(config)) {
        Ok(resolver) => resolver,
        Err(err) => {
            eprintln!("Cannot bind a UDP socket ({err}).");
            return ExitCode::FAILURE;
        }
    };

    let interactive = io::stdin().is_terminal();
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        if interactive {
            print!("DNSLOOKUP> ");
            let _ = io::stdout().flush();
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        // Anything from a comment character on is ignored.
        let command = line.split('#').next().unwrap_or("").trim();
        if command.is_empty() {
            continue;
        }
        let mut tokens = command.split_whitespace();
        let verb = match tokens.next() {
            Some(verb) => verb,
            None => continue,
        };
        let args: Vec<&str> = tokens.collect();

        if verb.eq_ignore_ascii_case("quit")
            || verb.eq_ignore_ascii_case("exit")
        {
            break;
        } else if verb.eq_ignore_ascii_case("server") {
            match args.as_slice() {
                [server] => match IpAddr::from_str(server) {
                    Ok(server) => {
                        resolver
                            .set_server(SocketAddr::new(server, DNS_PORT));
                        println!("Root DNS server is now: {server}");
                    }
                    Err(err) => {
                        println!("Invalid root server ({err}).");
                    }
                },
                _ => {
                    println!("Invalid call. Format:\n\tserver IP");
                }
            }
        } else if verb.eq_ignore_ascii_case("trace") {
            match args.as_slice() {
                [setting] if setting.eq_ignore_ascii_case("on") => {
                    resolver.set_trace(Some(Box::new(ConsoleTrace)));
                    println!("Verbose tracing is now: ON");
                }
                [setting] if setting.eq_ignore_ascii_case("off") => {
                    resolver.set_trace(None);
                    println!("Verbose tracing is now: OFF");
                }
                _ => {
                    eprintln!("Invalid call. Format:\n\ttrace on|off");
                }
            }
        } else if verb.eq_ignore_ascii_case("lookup")
            || verb.eq_ignore_ascii_case("l")
        {
            let (host, rtype) = match args.as_slice() {
                [host] => (*host, RecordType::A),
                [host, rtype] => match RecordType::from_str(rtype) {
                    Ok(rtype) => (*host, rtype),
                    Err(_) => {
                        eprintln!(
                            "Invalid query type. Must be one of:\n\
                             \tA, AAAA, NS, MX, CNAME"
                        );
                        continue;
                    }
                },
                _ => {
                    eprintln!(
                        "Invalid call. Format:\n\tlookup hostName [type]"
                    );
                    continue;
                }
            };
            let results = runtime.block_on(resolver.lookup(host, rtype));
            print_results(&Node::new(host, rtype), &results);
        } else if verb.eq_ignore_ascii_case("dump") {
            for (node, records) in resolver.cache().iter() {
                print_results(node, records);
            }
        } else {
            eprintln!("Invalid command. Valid commands are:");
            eprintln!("\tlookup fqdn [type]");
            eprintln!("\ttrace on|off");
            eprintln!("\tserver IP");
            eprintln!("\tdump");
            eprintln!("\tquit");
        }
    }
    println!("Goodbye!");
    ExitCode::SUCCESS
}

/// Prints the records resolved for a node, one line each.
///
/// An empty set prints a single placeholder line.
fn print_results<'a, I>(node: &Node, records: I)
where
    I: IntoIterator<Item = &'a ResourceRecord>,
{
    let mut records = records.into_iter().peekable();
    if records.peek().is_none() {
        println!(
            "{:<30} {:<5} {:<8} {}",
            node.host(),
            node.rtype().to_string(),
            -1,
            "0.0.0.0"
        );
    }
    for record in records {
        println!(
            "{:<30} {:<5} {:<8} {}",
            node.host(),
            node.rtype().to_string(),
            record.ttl(),
            record.data()
        );
    }
}

//------------ ConsoleTrace --------------------------------------------------

/// Prints every round trip and timeout to standard output.
struct ConsoleTrace;

impl TraceSink for ConsoleTrace {
    fn on_query_timeout(&mut self, query: &Query, server: SocketAddr) {
        println!("\n");
        println!(
            "Query ID     {} {} {} --> {}",
            query.id(),
            query.node().host(),
            query.node().rtype(),
            server.ip()
        );
    }

    fn on_round_trip(&mut self, log: &QueryLog) {
        let query = log.query();
        let response = log.response();
        println!("\n");
        println!(
            "Query ID     {} {}  {} --> {}",
            query.id(),
            query.node().host(),
            query.node().rtype(),
            log.server().ip()
        );
        println!(
            "Response ID: {} Authoritative = {}",
            response.id(),
            response.is_authoritative()
        );
        println!("  Answers ({})", response.answers().len());
        for record in response.answers() {
            print_trace_record(record);
        }
        println!("  Nameservers ({})", response.authority().len());
        for record in response.authority() {
            print_trace_record(record);
        }
        println!(
            "  Additional Information ({})",
            response.additional().len()
        );
        for record in response.additional() {
            print_trace_record(record);
        }
    }
}

fn print_trace_record(record: &ResourceRecord) {
    println!(
        "       {:<30} {:<10} {:<4} {}",
        record.host(),
        record.ttl(),
        record.rtype().to_string(),
        record.data()
    );
}
