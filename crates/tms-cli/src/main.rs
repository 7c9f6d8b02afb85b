mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::tier::TierSubcommand;
use std::path::PathBuf;
use tms_core::config::Scope;

#[derive(Parser)]
#[command(
    name = "cortex-tms",
    about = "Documentation governance: HOT/WARM/COLD tiers, staleness and validation for project docs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .cortexrc or .git/)
    #[arg(long, global = true, env = "CORTEX_TMS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .cortexrc and the governance file set, each with its tier tag
    Init {
        /// Documentation scope: nano, standard, or enterprise
        #[arg(long, default_value = "standard")]
        scope: Scope,

        /// Overwrite an existing .cortexrc (documents are never overwritten)
        #[arg(long)]
        force: bool,
    },

    /// Dashboard: tier counts, HOT files, validation health, size limits, staleness
    Status {
        /// Include per-tier token estimates
        #[arg(long)]
        tokens: bool,
    },

    /// Check mandatory files, size limits, config and staleness
    Validate {
        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,

        /// Skip the git staleness checks
        #[arg(long)]
        skip_staleness: bool,
    },

    /// Inspect and set document tiers
    Tier {
        #[command(subcommand)]
        subcommand: TierSubcommand,
    },

    /// Report governance docs that have fallen behind the code they describe
    Stale {
        /// Check a single doc instead of the configured list
        #[arg(long, requires = "watch")]
        doc: Option<String>,

        /// Code path to compare against (repeatable)
        #[arg(long, requires = "doc")]
        watch: Vec<String>,

        /// Override staleness.threshold_days
        #[arg(long)]
        threshold_days: Option<u32>,

        /// Override staleness.min_commits
        #[arg(long)]
        min_commits: Option<u32>,
    },

    /// Copy completed tasks from NEXT-TASKS.md into docs/archive/
    Archive {
        /// Preview without writing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { scope, force } => cmd::init::run(&root, scope, force, cli.json),
        Commands::Status { tokens } => cmd::status::run(&root, tokens, cli.json),
        Commands::Validate {
            strict,
            skip_staleness,
        } => cmd::validate::run(&root, strict, skip_staleness, cli.json),
        Commands::Tier { subcommand } => cmd::tier::run(&root, subcommand, cli.json),
        Commands::Stale {
            doc,
            watch,
            threshold_days,
            min_commits,
        } => cmd::stale::run(
            &root,
            cmd::stale::StaleArgs {
                doc,
                watch,
                threshold_days,
                min_commits,
            },
            cli.json,
        ),
        Commands::Archive { dry_run } => cmd::archive::run(&root, dry_run, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
