use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{commit, config, export, import};
use listport_models::ImportFormat;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "listporter")]
#[command(about = "Listporter - Move watchlists in and out without losing a row")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Explicit upload format for files whose extension is missing or misleading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ImportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ImportFormat::Csv,
            FormatArg::Json => ImportFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a watchlist file and preview what importing it would do
    #[command(
        long_about = "Parse a CSV or JSON watchlist export, match every row against the catalog, flag rows that already exist in the configured store, and print the resulting preview. Nothing is written to the store; save the preview with --out and feed it to 'commit' to apply it."
    )]
    Import {
        /// Path to the CSV or JSON file to import
        file: PathBuf,

        /// Force the upload format instead of detecting it
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Write the full preview as JSON to this path for a later commit
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Apply a reviewed preview to the watchlist store
    #[command(
        long_about = "Load a preview produced by 'import --out', apply the decisions file (candidate selections, row skips, and duplicate resolutions), and write the surviving items to the store. Items that fail are reported one by one; the rest still commit."
    )]
    Commit {
        /// Preview file written by 'import --out'
        preview: PathBuf,

        /// JSON file with candidate selections, skips, and duplicate resolutions
        #[arg(long, value_name = "PATH")]
        resolutions: Option<PathBuf>,

        /// Commit without asking for confirmation
        #[arg(short = 'y', long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Export the watchlist store to CSV or JSON
    #[command(
        long_about = "Serialize every entry in the configured store to a portable CSV or JSON file. The default filename embeds today's date, e.g. watchlist-2026-08-22.csv."
    )]
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Write to this path instead of the dated default
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Configure credentials and settings
    #[command(
        long_about = "Manage configuration and credentials for Listporter. Use subcommands to view settings, write a default config file, or store the catalog API key and watchlist service token."
    )]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Write a default config file if none exists
    Init,

    /// Store the catalog API key (hidden prompt)
    SetCatalogKey,

    /// Store the watchlist service token (hidden prompt)
    SetStoreToken,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Import { file, format, out } => {
            import::run_import(file, format.map(Into::into), out, &output).await
        }
        Commands::Commit {
            preview,
            resolutions,
            yes,
        } => commit::run_commit(preview, resolutions, yes, &output).await,
        Commands::Export { format, out } => export::run_export(format.into(), out, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
