mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, theme::ThemeSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "themekit",
    about = "Apply design themes to a front-end codebase and roll them back",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .themekit/, package.json or .git/)
    #[arg(long, global = true, env = "THEMEKIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available themes grouped by category
    Themes {
        /// Only show one category (e.g. futuristic)
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect or validate a single theme
    Theme {
        #[command(subcommand)]
        subcommand: ThemeSubcommand,
    },

    /// Report hardcoded colors and their semantic replacements
    Scan {
        /// Scan extra directories and infer mappings by hue and shade
        #[arg(long)]
        full: bool,
    },

    /// Apply a theme: back up, write artifacts, rewrite hardcoded colors
    Apply {
        /// Theme id
        theme: String,
        /// Scan extra directories and apply inferred mappings
        #[arg(long)]
        full: bool,
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List backups, newest first
    Backups,

    /// Restore a backup (default: the newest)
    Rollback {
        /// Backup id
        id: Option<String>,
    },

    /// Show the theme currently applied to the project
    Current,

    /// Inspect project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
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
        Commands::Themes { category } => cmd::themes::run(&root, category.as_deref(), cli.json),
        Commands::Theme { subcommand } => cmd::theme::run(&root, subcommand, cli.json),
        Commands::Scan { full } => cmd::scan::run(&root, full, cli.json),
        Commands::Apply {
            theme,
            full,
            dry_run,
        } => cmd::apply::run(&root, &theme, full, dry_run, cli.json),
        Commands::Backups => cmd::backups::run(&root, cli.json),
        Commands::Rollback { id } => cmd::rollback::run(&root, id.as_deref(), cli.json),
        Commands::Current => cmd::current::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
