//! viewcache CLI: warm the compiled-template cache ahead of serving traffic.
//!
//! Provides `viewcache warm` to pre-cache every template under the configured
//! roots, `viewcache render` to resolve and render one template through the
//! cache, and `viewcache hash` to print content fingerprints.

#![warn(missing_docs)]

mod hash;
mod render;
mod setup;
mod warm;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// viewcache: a content-addressed template pre-cache.
#[derive(Parser, Debug)]
#[command(name = "viewcache", version, about = "Template pre-cache")]
pub struct Cli {
    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log per-file cache decisions.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `viewcache.toml` file. Defaults to the one in the current
    /// directory, if any.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pre-cache every template under the roots.
    Warm(WarmArgs),
    /// Resolve one template through the cache and print its output.
    Render(RenderArgs),
    /// Print the content fingerprint of each file.
    Hash {
        /// Files to fingerprint.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Arguments for `viewcache warm`.
#[derive(Parser, Debug)]
pub struct WarmArgs {
    /// Root directories to scan. Replaces `cache.roots` when given.
    pub roots: Vec<PathBuf>,

    /// Maximum number of templates resolved at once.
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Artifact store backend.
    #[arg(long, value_enum)]
    pub store: Option<StoreChoice>,

    /// Cache directory for the file store.
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `viewcache render`.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Template file to render.
    pub file: PathBuf,

    /// Render context as a JSON object.
    #[arg(short, long)]
    pub data: Option<String>,
}

/// Store backend selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreChoice {
    /// Process-local map.
    Memory,
    /// Cache directory on disk.
    File,
    /// Redis server.
    Redis,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a config file.
    pub config: Option<PathBuf>,
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Warm(ref args) => warm::run(args, &global).await,
        Command::Render(ref args) => render::run(args, &global).await,
        Command::Hash { ref files } => hash::run(files),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
