use anyhow::{bail, Context, Result};
use clap::Parser;
use gridopt_algo::{AnalysisConfig, AnalysisKind, GridOptimizer};
use gridopt_core::{Diagnostics, Network, NetworkSnapshot};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level)?;

    match cli.command {
        Commands::Analyze { network, out } => {
            let mut optimizer = GridOptimizer::new(load_network(&network)?).with_config(config);
            let outcomes = optimizer.run_all();
            let json = optimizer.registry().to_json_pretty()?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("writing report {}", path.display()))?;
                    info!(path = %path.display(), "report written");
                }
                None => println!("{json}"),
            }
            let failed: Vec<String> = [
                (AnalysisKind::SpanningTree, outcomes.spanning_tree.as_ref().err()),
                (AnalysisKind::MinCostFlow, outcomes.min_cost_flow.as_ref().err()),
                (AnalysisKind::Connectivity, outcomes.connectivity.as_ref().err()),
            ]
            .into_iter()
            .filter_map(|(kind, err)| err.map(|e| format!("{kind}: {e}")))
            .collect();
            if !failed.is_empty() {
                bail!("{} analyses failed: {}", failed.len(), failed.join("; "));
            }
        }
        Commands::Mst { network, method } => {
            let mut config = config;
            if let Some(method) = method {
                config.mst.method = method.into();
            }
            let mut optimizer = GridOptimizer::new(load_network(&network)?).with_config(config);
            let forest = optimizer.spanning_tree()?;
            println!("{}", serde_json::to_string_pretty(&forest.summary)?);
        }
        Commands::Flow { network } => {
            let mut optimizer = GridOptimizer::new(load_network(&network)?).with_config(config);
            let report = optimizer.min_cost_flow()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Centrality {
            network,
            weight,
            normalized,
        } => {
            let mut config = config;
            if let Some(weight) = weight {
                config.centrality.weight = weight.into();
            }
            config.centrality.normalized |= normalized;
            let mut optimizer = GridOptimizer::new(load_network(&network)?).with_config(config);
            let report = optimizer.connectivity()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Validate { network } => {
            let network = load_network(&network)?;
            let mut diag = Diagnostics::new();
            network.validate_into(&mut diag);
            println!("{}", network.stats());
            print!("{diag}");
            if diag.has_errors() {
                bail!("validation found {} errors", diag.error_count());
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

/// Stderr logging; `RUST_LOG` directives are combined with `level`.
fn init_logging(level: &str) -> Result<()> {
    let directive: Directive = level
        .parse()
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn load_network(path: &Path) -> Result<Network> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading network {}", path.display()))?;
    let snapshot: NetworkSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("parsing network {}", path.display()))?;
    let network = Network::from_snapshot(&snapshot)
        .with_context(|| format!("building network from {}", path.display()))?;
    info!(
        nodes = network.node_count(),
        lines = network.line_count(),
        "network loaded"
    );
    Ok(network)
}
