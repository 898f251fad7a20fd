use clap::{Parser, Subcommand, ValueEnum};
use gridopt_algo::{CentralityWeight, MstMethod};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridopt", author, version, about, long_about = None)]
pub struct Cli {
    /// Analysis configuration (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overriding `[logging] level` from the config
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run spanning tree, min-cost flow and connectivity, print the registry
    Analyze {
        /// Network snapshot (JSON)
        network: PathBuf,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Minimum-length spanning tree
    Mst {
        network: PathBuf,
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
    },
    /// Demand-balanced minimum-cost flow
    Flow { network: PathBuf },
    /// Betweenness centrality, clustering and degree
    Centrality {
        network: PathBuf,
        #[arg(long, value_enum)]
        weight: Option<WeightArg>,
        /// Normalize betweenness by the number of node pairs
        #[arg(long)]
        normalized: bool,
    },
    /// Check a network for conditions that analyses will reject
    Validate { network: PathBuf },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    Kruskal,
    Prim,
}

impl From<MethodArg> for MstMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Kruskal => MstMethod::Kruskal,
            MethodArg::Prim => MstMethod::Prim,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WeightArg {
    Hops,
    Length,
}

impl From<WeightArg> for CentralityWeight {
    fn from(arg: WeightArg) -> Self {
        match arg {
            WeightArg::Hops => CentralityWeight::Hops,
            WeightArg::Length => CentralityWeight::Length,
        }
    }
}
