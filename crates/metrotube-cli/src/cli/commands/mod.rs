//! Command definitions and dispatch.

mod feed;
mod session_cmd;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use metrotube::config::{default_config_path, default_session_path, Settings};
use metrotube::models::Operation;
use metrotube::session::SessionState;
use metrotube_scrape::ContentService;

#[derive(Parser)]
#[command(name = "metrotube")]
#[command(about = "Video metadata retrieval over the internal API or public pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to the platform config dir)
    #[arg(short, long, global = true, env = "METROTUBE_CONFIG")]
    config: Option<PathBuf>,

    /// Session file (JSON) captured by a credential collaborator
    #[arg(short, long, global = true, env = "METROTUBE_SESSION")]
    session: Option<PathBuf>,

    /// Print JSON instead of a styled list
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Home feed
    Home,

    /// Search for videos
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Personalized recommendations (trending when signed out)
    Recommendations,

    /// Your library (requires a valid session)
    Library,

    /// Videos in a playlist
    Playlist {
        /// Playlist ID
        id: String,
    },

    /// Details of one video
    Video {
        /// Video ID
        id: String,
    },

    /// Videos related to one video
    Related {
        /// Video ID
        id: String,
    },

    /// Videos on a channel page
    Channel {
        /// Channel ID
        id: String,
    },

    /// Inspect or clear the stored session
    Session {
        #[command(subcommand)]
        command: Option<SessionCommands>,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Show validity, routing channel and account details
    Show,
    /// Forget every stored credential
    Clear,
}

impl Commands {
    fn operation(&self) -> Option<Operation> {
        let operation = match self {
            Commands::Home => Operation::Home,
            Commands::Search { query } => Operation::search(query.join(" ")),
            Commands::Recommendations => Operation::Recommendations,
            Commands::Library => Operation::Library,
            Commands::Playlist { id } => Operation::playlist(id.as_str()),
            Commands::Video { id } => Operation::video_detail(id.as_str()),
            Commands::Related { id } => Operation::related(id.as_str()),
            Commands::Channel { id } => Operation::channel(id.as_str()),
            Commands::Session { .. } => return None,
        };
        Some(operation)
    }
}

/// Load settings from the given or default config file, then apply env
/// overrides and validate.
fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let settings = settings.with_env_overrides();
    settings.validate()?;
    Ok(settings)
}

/// Resolve the session file: the explicit path, else the platform default.
fn session_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf).or_else(default_session_path)
}

/// Read a session file. A missing file is an empty session.
fn read_session(path: Option<&Path>) -> anyhow::Result<SessionState> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(SessionState::new());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read session file {}: {}", path.display(), e))?;
    let session = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid session file {}: {}", path.display(), e))?;
    tracing::debug!("Loaded session from {}", path.display());
    Ok(session)
}

/// Apply `METROTUBE_COOKIES`, `METROTUBE_VISITOR_DATA` and `METROTUBE_TOKEN`.
fn apply_session_overrides<F>(session: &mut SessionState, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(cookies) = lookup("METROTUBE_COOKIES") {
        session.set_cookies(cookies);
    }
    if let Some(visitor) = lookup("METROTUBE_VISITOR_DATA") {
        session.set_visitor_data(visitor);
    }
    if let Some(token) = lookup("METROTUBE_TOKEN") {
        session.set_advanced_token(token);
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    let session_file = session_path(cli.session.as_deref());
    let mut session = read_session(session_file.as_deref())?;
    apply_session_overrides(&mut session, |key| std::env::var(key).ok());

    let Some(operation) = cli.command.operation() else {
        return match cli.command {
            Commands::Session {
                command: Some(SessionCommands::Clear),
            } => session_cmd::cmd_session_clear(&mut session, session_file.as_deref()),
            _ => session_cmd::cmd_session_show(&session, cli.json),
        };
    };

    let service = ContentService::from_settings(&settings)?;
    feed::cmd_load(&service, &operation, &session, cli.json).await
}
