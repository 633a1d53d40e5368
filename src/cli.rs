use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::params::FlowParams;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
}

#[derive(Parser)]
#[command(name = "cflow")]
#[command(
    about = "Mine the most common sentence patterns in a comment history and show them as phrase trees"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build sentence-pattern trees from a comment export
    Flow(FlowArgs),

    /// List the scored tree roots without building trees
    Roots(RootsArgs),

    /// Show the highlighted branch for one node of one tree
    Branch(BranchArgs),

    /// Initialize a commentflow.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FlowFormat {
    /// Indented tree per root
    Tree,
    /// One JSON array of node arrays
    Json,
    /// One JSON node array per line
    Jsonl,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RootsFormat {
    /// Aligned table
    Table,
    /// JSON array
    Json,
}

/// Threshold overrides shared by every mining command
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Minimum continuations a root needs
    #[arg(long)]
    pub min_continuations: Option<usize>,

    /// Number of trees to build
    #[arg(long)]
    pub max_roots: Option<usize>,

    /// Index at most this many sentences
    #[arg(long)]
    pub max_sentences: Option<usize>,

    /// Keep at most this many continuations per root
    #[arg(long)]
    pub max_continuations_per_root: Option<usize>,

    /// Truncate branches deeper than this level
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl ParamArgs {
    /// Apply CLI overrides on top of configured parameters
    pub fn apply(&self, mut params: FlowParams) -> FlowParams {
        if let Some(v) = self.min_continuations {
            params.min_continuations = v;
        }
        if let Some(v) = self.max_roots {
            params.max_roots = v;
        }
        if let Some(v) = self.max_depth {
            params.max_depth = v;
        }
        if self.max_sentences.is_some() {
            params.max_sentences = self.max_sentences;
        }
        if self.max_continuations_per_root.is_some() {
            params.max_continuations_per_root = self.max_continuations_per_root;
        }
        params
    }
}

#[derive(Parser, Debug)]
pub struct FlowArgs {
    /// Comment export (JSON array, {"comments": [...]}, or JSON Lines); `-` reads stdin
    pub input: PathBuf,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<FlowFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print per-tree leaf and depth metrics
    #[arg(long)]
    pub stats: bool,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Parser, Debug)]
pub struct RootsArgs {
    /// Comment export; `-` reads stdin
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = RootsFormat::Table)]
    pub format: RootsFormat,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Parser, Debug)]
pub struct BranchArgs {
    /// Comment export; `-` reads stdin
    pub input: PathBuf,

    /// Zero-based tree index (score order)
    #[arg(long, default_value_t = 0)]
    pub tree: usize,

    /// Node id to hover
    #[arg(long)]
    pub node: String,

    /// Emit the highlighted ids as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
