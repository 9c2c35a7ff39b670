mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod sample_data;
mod services;
mod session;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{config::Config, database::Database, http_server::app::HttpServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "MUSIC_STORE_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. "info" or "music_store=debug,tower_http=info"
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the storefront and GraphQL API
    Serve {
        /// The port to run the server on, overrides the config file
        #[arg(short, long, env = "MUSIC_STORE_HTTP_PORT")]
        port: Option<u16>,

        /// Fill an empty catalog with sample albums before serving
        #[arg(long)]
        seed: bool,

        /// Public URL of the store (allowed CORS origin)
        #[arg(long, env = "BASE_URL")]
        base_url: Option<String>,
    },
    /// Fill an empty catalog with sample albums
    Seed,
    /// Apply pending database migrations
    Migrate,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load music-store config")?;

    let tracer_provider = logging::init_tracing(
        env!("CARGO_PKG_NAME"),
        config.telemetry.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args.command, config).await;

    if let Some(tracer_provider) = tracer_provider
        && let Err(e) = tracer_provider.shutdown()
    {
        log::warn!("Failed to shut down tracer provider: {}", e);
    }

    result
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                log::info!("Default config written to {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Migrate => {
            let database = Database::connect(&config.database_path()).await?;
            let pending = database.pending_migrations().await?;
            if pending.is_empty() {
                log::info!("Database is up to date");
            } else {
                for name in &pending {
                    log::info!("Applying migration {}", name);
                }
                database.run_migrations().await?;
                log::info!("Applied {} migrations", pending.len());
            }
        }
        Commands::Seed => {
            let database = Database::open(&config.database_path()).await?;
            sample_data::seed(&database).await?;
        }
        Commands::Serve {
            port,
            seed,
            base_url,
        } => {
            // Set default base_url in debug mode, require it in release mode
            let base_url = if let Some(url) = base_url {
                url
            } else if cfg!(debug_assertions) {
                "http://localhost:3000".to_string()
            } else {
                return Err(color_eyre::eyre::eyre!(
                    "BASE_URL is required in release mode. Set it via --base-url or BASE_URL environment variable"
                ));
            };

            log::debug!("Opening database at: {}", config.database_path().display());
            let database = Database::open(&config.database_path()).await?;
            if seed {
                sample_data::seed(&database).await?;
            }

            let port = port.unwrap_or(config.http.port);
            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig {
                port,
                database,
                config,
                base_url,
            })
            .await?;
        }
    }

    Ok(())
}
