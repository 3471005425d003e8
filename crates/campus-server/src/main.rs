//! campus-server binary.
//!
//! Reads `campus.toml` (or the path specified with `--config`), opens the
//! SQLite store named by `database_url`, and serves the gateway over HTTP.
//!
//! Configuration sources, later ones winning:
//!
//! 1. the TOML file (optional),
//! 2. `CAMPUS_*` environment variables (e.g. `CAMPUS_PORT=9000`),
//! 3. `DATABASE_URL`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use campus_server::{AppState, ServerConfig};
use campus_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campus school backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "campus.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CAMPUS"))
    .set_override_option("database_url", std::env::var("DATABASE_URL").ok())
    .context("failed to apply DATABASE_URL")?
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store, if one is configured.
  let store = match server_cfg.database_path() {
    Some(path) => {
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!("Using database at {}", path.display());
      Some(Arc::new(store))
    }
    None => {
      tracing::warn!("no database configured; requests will fail until DATABASE_URL is set");
      None
    }
  };

  let app = campus_server::router(AppState { store });
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
