//! OpsDeck CLI - Terminal client for the ops-console backend.
//!
//! Provides a fully functional CLI for the admin dashboard's backend:
//! sign in, manage teams/users/meetings, read WhatsApp traffic, chat with
//! the assistant, and track transcript-parse jobs from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use od_core::config::{AppConfig, ConfigHandle};
use od_core::error::OdResult;
use od_core::logging;
use od_core::platform::Platform;

/// OpsDeck - terminal client for the ops console.
#[derive(Parser)]
#[command(
    name = "opsdeck",
    version,
    about = "OpsDeck ops-console CLI",
    long_about = "A command-line client for the ops-console backend.\n\
                   Sign in once, then manage teams, users, meetings, WhatsApp traffic,\n\
                   transcript-parse jobs, and the assistant chat from the terminal."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the backend and persist the session.
    Login {
        /// Account email address.
        #[arg(short, long)]
        email: Option<String>,
        /// Account password (prompted interactively when omitted).
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// Show the currently signed-in user.
    Whoami,
    /// List and manage teams.
    Teams {
        #[command(subcommand)]
        action: commands::teams::TeamsAction,
    },
    /// List and manage users.
    Users {
        #[command(subcommand)]
        action: commands::users::UsersAction,
    },
    /// List and manage meetings, including transcript-parse jobs.
    Meetings {
        #[command(subcommand)]
        action: commands::meetings::MeetingsAction,
    },
    /// Browse WhatsApp messages.
    Whatsapp {
        #[command(subcommand)]
        action: commands::whatsapp::WhatsappAction,
    },
    /// Chat with the assistant.
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Show the analytics overview.
    Analytics,
    /// Show the signed-in user's profile.
    Profile,
    /// View and modify settings.
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// View application logs.
    Logs {
        /// Number of log lines to show.
        #[arg(short = 'n', long, default_value = "50")]
        count: u32,
        /// Follow log output in real-time (tail -f style).
        #[arg(short = 'F', long)]
        follow: bool,
        /// Filter log level (trace, debug, info, warn, error).
        #[arg(short, long)]
        level: Option<String>,
    },
    /// Local store management commands.
    Db {
        #[command(subcommand)]
        action: commands::db::DbAction,
    },
}

#[tokio::main]
async fn main() -> OdResult<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let log_dir = Platform::data_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("logs");
    let _guard = logging::init_logging(log_level, &log_dir, false)?;

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        let mut config = AppConfig::load_from_file(std::path::Path::new(path))?;
        config.apply_env_overrides();
        config
    } else {
        AppConfig::load_default()?
    };

    let config_handle = ConfigHandle::new(config);

    info!("OpsDeck CLI v{}", od_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Login { email, password } => {
            commands::login::run(config_handle, email, password).await
        }
        Commands::Logout => commands::logout::run(config_handle).await,
        Commands::Whoami => commands::whoami::run(config_handle, cli.format).await,
        Commands::Teams { action } => {
            commands::teams::run(config_handle, action, cli.format).await
        }
        Commands::Users { action } => {
            commands::users::run(config_handle, action, cli.format).await
        }
        Commands::Meetings { action } => {
            commands::meetings::run(config_handle, action, cli.format).await
        }
        Commands::Whatsapp { action } => {
            commands::whatsapp::run(config_handle, action, cli.format).await
        }
        Commands::Chat { action } => {
            commands::chat::run(config_handle, action, cli.format).await
        }
        Commands::Analytics => commands::analytics::run(cli.format).await,
        Commands::Profile => commands::profile::run(config_handle, cli.format).await,
        Commands::Settings { action } => {
            commands::settings::run(config_handle, action, cli.format).await
        }
        Commands::Logs { count, follow, level } => {
            commands::logs::run(config_handle, count, follow, level, cli.format).await
        }
        Commands::Db { action } => {
            commands::db::run(config_handle, action, cli.format).await
        }
    }
}
