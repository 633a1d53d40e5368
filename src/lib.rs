//! **commentflow** - Sentence-pattern trees from a comment history
//!
//! Finds the words a writer most often opens a thought with, then shows how
//! their sentences typically continue as small branching phrase trees.
//! Deterministic: the same corpus always yields byte-identical trees.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - tokenize, mine roots, build and aggregate trees
pub mod core {
    /// Tunable thresholds and their defaults
    pub mod params;
    pub use params::FlowParams;

    /// Sentence splitting and token cleaning
    pub mod sentence;
    pub use sentence::{Sentence, extract_sentences, tokenize};

    /// Root bucket indexing, eligibility and scoring
    pub mod roots;
    pub use roots::{ScoredRoot, mine_roots};

    /// Per-root recursive phrase-tree builder
    pub mod builder;
    pub use builder::{FlowTree, TreeBuilder, TreeNode, build_tree};

    /// Adjacency view, metrics, branch highlighting and printing
    pub mod tree;
    pub use tree::{TreeShapeError, TreeView};

    /// Multi-tree aggregation, memoizing engine and command drivers
    pub mod flow;
    pub use flow::{
        FlowEngine, FlowReport, build_flow_report, build_flow_trees, run_branch as branch_run,
        run_flow as flow_run, run_roots as roots_run,
    };
}

/// Input decoding - comment records and export formats
pub mod parsers {
    /// Comment record model and JSON / JSON Lines decoding
    pub mod comments;
    pub use comments::{Comment, InputError, parse_comments};
}

/// Infrastructure - Configuration and input I/O
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped input reading with stdin support
    pub mod io;
    pub use io::{InputContent, read_input};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{branch_run, flow_run, roots_run};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{FlowEngine, FlowParams, FlowReport, FlowTree, TreeNode, build_flow_trees};
pub use parsers::{Comment, parse_comments};
