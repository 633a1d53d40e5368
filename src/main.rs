use anyhow::Result;
use clap::Parser;
use commentflow::cli::{AppContext, Cli, Commands};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the `-v` log level
const LOG_ENV: &str = "COMMENTFLOW_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Flow(args) => commentflow::flow_run(args, &ctx),
        Commands::Roots(args) => commentflow::roots_run(args, &ctx),
        Commands::Branch(args) => commentflow::branch_run(args, &ctx),
        Commands::Init(args) => commentflow::infra::config::init(args, &ctx),
        Commands::Completions(args) => commentflow::completion::run(args, &ctx),
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter)
        .init();
}
