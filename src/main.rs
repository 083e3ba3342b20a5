//! sentinel-check - check which Sentinel nodes accept a connection
//!
//! Every `--sentinel` endpoint becomes its own node, and all nodes are
//! connected in parallel, one thread per node.

use std::process::ExitCode;
use std::thread;

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use valkey_sentinel_node::adapter::{configured_adapter, RawAdapter};
use valkey_sentinel_node::config::{AdapterConfig, CliArgs};
use valkey_sentinel_node::{ClientAdapter, ConnectionError, SentinelNode};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn make_adapter(raw: bool, config: &AdapterConfig) -> Box<dyn ClientAdapter> {
    if raw {
        Box::new(RawAdapter::new(config.clone()))
    } else {
        configured_adapter(config.clone())
    }
}

fn build_nodes(args: &CliArgs, config: &AdapterConfig) -> Result<Vec<SentinelNode>> {
    let mut nodes = Vec::new();
    for (address, port) in args.endpoints()? {
        let adapter = make_adapter(args.raw, config);
        nodes.push(SentinelNode::with_boxed_adapter(address, port, adapter)?);
    }
    Ok(nodes)
}

/// Report label: the node's endpoint, prefixed with the set name if given
fn node_label(set_name: Option<&str>, node: &SentinelNode) -> String {
    match set_name {
        Some(name) => format!("{}@{}", name, node),
        None => node.to_string(),
    }
}

/// Connect each node on its own thread; results keep input order
fn connect_all(nodes: Vec<SentinelNode>) -> Vec<(SentinelNode, Result<(), ConnectionError>)> {
    thread::scope(|s| {
        let handles: Vec<_> = nodes
            .into_iter()
            .map(|mut node| {
                s.spawn(move || {
                    let outcome = node.connect();
                    (node, outcome)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("connect thread panicked"))
            .collect()
    })
}

fn run() -> Result<bool> {
    let args = CliArgs::parse_args();
    setup_logging(args.verbose, args.quiet);

    let config = args.adapter_config()?;
    let nodes = build_nodes(&args, &config)?;

    info!(
        "Checking {} sentinel node(s) with the {} adapter",
        nodes.len(),
        nodes.first().and_then(|n| n.backend()).unwrap_or("default")
    );

    let results = connect_all(nodes);
    let mut reachable = 0;

    for (node, outcome) in &results {
        let label = node_label(args.name.as_deref(), node);
        match outcome {
            Ok(()) => {
                reachable += 1;
                println!("{:<45} OK", label);
            }
            Err(e) => println!("{:<45} FAILED: {}", label, e),
        }
    }

    info!("{}/{} sentinel node(s) reachable", reachable, results.len());
    Ok(reachable > 0)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
