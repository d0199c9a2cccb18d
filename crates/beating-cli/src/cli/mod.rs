//! CLI entry and dispatch.
//!
//! Each subcommand plays the role of a "view": the session is settled
//! (`initialize`) before any command logic runs, so nothing gates on a
//! Loading session.

use anyhow::{Context, Result};
use clap::Parser;
use beating_core::auth::flow::AuthFlowCoordinator;
use beating_core::config::Config;
use beating_core::storage::StateStore;

mod commands;

#[derive(Parser)]
#[command(name = "beating")]
#[command(version)]
#[command(about = "Beating music-review client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL from config
    #[arg(long, env = "BEATING_API_URL", value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Start a review for a song (requires login)
    Review {
        /// Song title
        #[arg(long)]
        song: String,
        /// Artist name
        #[arg(long)]
        artist: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let config = Config::load().context("load config")?;
    let api_url = cli.api_url.unwrap_or(config.api_url);

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli.command, &api_url).await })
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(command: Commands, api_url: &str) -> Result<()> {
    let mut flow = AuthFlowCoordinator::new(StateStore::open_default());
    flow.initialize().context("initialize session")?;

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&mut flow, api_url, &email, &password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => commands::auth::register(&mut flow, api_url, &username, &email, &password).await,
        Commands::Logout => commands::auth::logout(&mut flow),
        Commands::Whoami => commands::auth::whoami(&flow),
        Commands::Review { song, artist } => {
            commands::review::start(&mut flow, &song, artist.as_deref())
        }
    }
}
