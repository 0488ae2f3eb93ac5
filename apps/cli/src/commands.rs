//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use deckbuilder_convert::NbConvert;
use deckbuilder_core::pipeline::{self, BatchResult, ProgressReporter};
use deckbuilder_shared::{AppConfig, BatchConfig, ConflictPolicy, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DeckBuilder — batch-convert notebooks into HTML slide decks.
#[derive(Parser)]
#[command(
    name = "deckbuilder",
    version,
    about = "Convert per-topic notebooks into HTML slide decks and collect them in one place.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert every notebook under the root's topic subdirectories.
    Build {
        /// Root directory holding topic subdirectories (defaults from config).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Shared collection directory (defaults to <root>/slides).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Notebook extension to match.
        #[arg(long)]
        ext: Option<String>,

        /// Number of concurrent conversions.
        #[arg(short, long)]
        jobs: Option<u32>,

        /// Collection filename collision policy: overwrite or error.
        #[arg(long)]
        on_conflict: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "deckbuilder=info",
        1 => "deckbuilder=debug",
        _ => "deckbuilder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            root,
            out,
            ext,
            jobs,
            on_conflict,
        } => cmd_build(root, out, ext, jobs, on_conflict).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

async fn cmd_build(
    root: Option<PathBuf>,
    out: Option<PathBuf>,
    ext: Option<String>,
    jobs: Option<u32>,
    on_conflict: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    // Flags override config file values, which override defaults.
    let mut batch = BatchConfig::from(&config);
    let explicit_collection = out.is_some() || config.defaults.collection_dir.is_some();
    if let Some(root) = root {
        batch.set_root(root, explicit_collection);
    }
    if let Some(out) = out {
        batch.collection_dir = out;
    }
    if let Some(ext) = ext {
        batch.notebook_ext = ext;
    }
    if let Some(jobs) = jobs {
        batch.jobs = jobs.max(1);
    }
    if let Some(policy) = on_conflict {
        batch.on_conflict = policy.parse::<ConflictPolicy>()?;
    }

    let converter = Arc::new(NbConvert::new(
        config.converter.command.clone(),
        config.converter.format.clone(),
    ));

    info!(
        root = %batch.root.display(),
        collection = %batch.collection_dir.display(),
        jobs = batch.jobs,
        "building slide decks"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build_slides(&batch, converter, &reporter).await?;

    println!();
    println!("  Slide decks built!");
    println!("  Converted:  {}", result.converted);
    println!("  Collection: {}", result.collection_dir.display());
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner, with one printed
/// line per collected deck.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn deck_built(&self, notebook: &str, dest: &str, current: usize, total: usize) {
        self.spinner
            .println(format!("Converted {notebook} -> {dest}"));
        self.spinner
            .set_message(format!("Converting [{current}/{total}]"));
    }

    fn done(&self, _result: &BatchResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
