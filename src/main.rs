use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use worktohome::api::AppState;
use worktohome::auth::{TokenAuthenticator, generate_token};
use worktohome::commute::{bounding_box, build_estimate};
use worktohome::config::{StorageBackend, WorkToHomeConfig};
use worktohome::models::{Coordinate, RouteType};
use worktohome::services::UserService;
use worktohome::{import, store, telemetry, web};

/// Housing search backend with commute estimation from your work location
#[derive(Parser)]
#[command(name = "worktohome", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Estimate a commute between two coordinates
    Estimate {
        /// Work location as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        /// Listing location as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,
        /// driving, walking, transit or biking
        #[arg(long, default_value = "driving")]
        route: RouteType,
    },
    /// Print the prefilter box for a nearby search
    Bbox {
        /// Center as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        center: Coordinate,
        /// Radius in miles
        #[arg(long)]
        radius: f64,
    },
    /// Create a user and print an access token for the config file
    AddUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },
    /// Load housing listings from a JSON array
    ImportListings {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = WorkToHomeConfig::load_from_path(cli.config.clone())?;
    telemetry::init_logging(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Estimate { from, to, route } => {
            let estimate = build_estimate(&from, &to, route);
            println!("{}", serde_json::to_string_pretty(&estimate)?);
            Ok(())
        }
        Command::Bbox { center, radius } => {
            let bbox = bounding_box(&center, radius);
            println!("{}", serde_json::to_string_pretty(&bbox)?);
            Ok(())
        }
        Command::AddUser { email, username } => add_user(&config, &email, &username).await,
        Command::ImportListings { path } => import_file(&config, path).await,
    }
}

async fn serve(mut config: WorkToHomeConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let repos = store::open(&config.storage).context("Failed to open storage")?;
    let authenticator = Arc::new(TokenAuthenticator::new(config.auth.tokens.clone()));
    info!(
        "Starting worktohome {} with {} configured access tokens",
        worktohome::VERSION,
        config.auth.tokens.len()
    );

    let state = AppState::new(repos, config.search.clone(), authenticator);
    web::run(state, &config.server).await
}

fn require_persistent(config: &WorkToHomeConfig, command: &str) -> Result<()> {
    if config.storage.backend == StorageBackend::Memory {
        bail!("{command} needs storage.backend = \"fjall\"; the memory backend keeps nothing");
    }
    Ok(())
}

async fn add_user(config: &WorkToHomeConfig, email: &str, username: &str) -> Result<()> {
    require_persistent(config, "add-user")?;
    let repos = store::open(&config.storage).context("Failed to open storage")?;

    let user = UserService::new(repos).register(email, username).await?;
    let token = generate_token();

    println!("Created user {} ({})", user.username, user.id);
    println!("Add this to the [auth.tokens] table of your config:");
    println!("\"{token}\" = \"{}\"", user.id);
    Ok(())
}

async fn import_file(config: &WorkToHomeConfig, path: PathBuf) -> Result<()> {
    require_persistent(config, "import-listings")?;
    let repos = store::open(&config.storage).context("Failed to open storage")?;

    let file =
        File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    let count = import::import_listings(repos.housing.as_ref(), file).await?;
    println!("Imported {count} listings from {}", path.display());
    Ok(())
}
