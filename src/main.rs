use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use n8n_backup_manager::{cli, restore::RestoreMode};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// n8n Backup Manager: download workflows into an owner/tag folder tree and restore them later
#[derive(Parser)]
#[command(name = "n8nbak", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download all workflows into a timestamped backup directory
    Backup {
        /// Directory to create the backup under (defaults to BACKUP_DIR)
        output_dir: Option<String>,
    },

    /// Restore workflows from a backup directory
    Restore {
        /// Backup directory to restore from (interactive selection when omitted)
        backup_dir: Option<String>,

        /// How to handle workflows whose name already exists on the instance
        #[arg(short, long, value_enum)]
        mode: Option<RestoreMode>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// List the files that would be restored without touching the instance
        #[arg(long)]
        dry_run: bool,
    },

    /// Test authorization to the n8n instance
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Variables already set in the environment win over the dotenv file;
    // a missing file is fine, credentials may come from the environment.
    if let Err(e) = dotenvy::from_filename(&cli.env) {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Backup { output_dir } => cli::run_backup(output_dir).await,
        Commands::Restore {
            backup_dir,
            mode,
            yes,
            dry_run,
        } => cli::run_restore(backup_dir, mode, yes, dry_run).await,
        Commands::Auth => cli::run_auth().await,
    }
}
