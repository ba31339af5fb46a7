//! skylog server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the flight-test data API over HTTP.
//! Every setting can also come from the environment with a `SKYLOG_` prefix,
//! e.g. `SKYLOG_SESSION_SECRET`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use skylog_api::{AppState, SessionKey};
use skylog_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "skylog flight-test data server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,
  #[serde(default = "default_port")]
  port: u16,

  /// SQLite database path. When unset the store runs without a backing
  /// database: reads come back empty and writes fail.
  store_path: Option<PathBuf>,

  /// Key for signing session cookies.
  session_secret: String,

  /// Open id whose user record is promoted to `admin` on sign-in.
  owner_open_id: Option<String>,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
    .add_source(config::Environment::with_prefix("SKYLOG"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store, or run degraded when no path is configured.
  let store = match &server_cfg.store_path {
    Some(path) => {
      let path = expand_tilde(path);
      SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?
    }
    None => {
      tracing::warn!(
        "no store_path configured; running without a database \
         (reads are empty, writes fail)"
      );
      SqliteStore::unconfigured()
    }
  };
  let store = store.with_owner_open_id(server_cfg.owner_open_id.clone());

  let state = AppState {
    store:    Arc::new(store),
    sessions: Arc::new(SessionKey::new(&server_cfg.session_secret)),
  };

  let app = skylog_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
