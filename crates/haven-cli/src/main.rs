//! `haven` — command-line companion for evaluating homes.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and runs the requested subcommand.
//!
//! # Usage
//!
//! ```
//! haven add-home --address "12 Elm St" --price 650000 --bedrooms 3 --bathrooms 2.5
//! haven homes
//! haven rate <ADDRESS> exteriors curb_appeal good
//! haven compare "12 Elm" "9 Oak"
//! ```

mod app;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use haven_core::session::SessionContext;
use haven_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "haven", about = "Home-buying companion")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Path to the SQLite store (overrides the config file).
  #[arg(long, env = "HAVEN_STORE_PATH")]
  store: Option<PathBuf>,

  /// Acting user id (overrides the config file).
  #[arg(long, env = "HAVEN_USER_ID")]
  user: Option<Uuid>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Save a new home.
  AddHome {
    #[arg(long)]
    address:        String,
    #[arg(long)]
    neighborhood:   Option<String>,
    #[arg(long)]
    price:          f64,
    #[arg(long)]
    bedrooms:       u8,
    #[arg(long)]
    bathrooms:      f32,
    #[arg(long)]
    year_built:     Option<u16>,
    #[arg(long)]
    property_taxes: Option<f64>,
    #[arg(long)]
    square_footage: Option<u32>,
  },
  /// List saved homes with their evaluation status.
  Homes,
  /// Answer a rubric item: `rate <home> <category> <item> <value>`.
  Rate {
    home:     String,
    category: String,
    item:     String,
    value:    String,
  },
  /// Attach a note to a rubric item.
  Note {
    home:     String,
    category: String,
    item:     String,
    text:     String,
  },
  /// Attach a note to a whole category.
  SectionNote {
    home:     String,
    category: String,
    text:     String,
  },
  /// Record your own 1-5 star gut rating.
  Stars { home: String, stars: u8 },
  /// Record the offer decision: yes, maybe, no, or clear.
  Offer { home: String, intent: String },
  /// Mark an evaluation completed (requires 100% answered).
  Complete { home: String },
  /// Show inspection progress, optionally filtered.
  Inspect {
    home:   String,
    /// all, good, fix, replace, or not-rated.
    #[arg(long, default_value = "all")]
    filter: String,
  },
  /// Record an inspection verdict: `inspect-rate <home> <category> <item> <verdict>`.
  InspectRate {
    home:     String,
    category: String,
    item:     String,
    /// good, fix, replace, or clear.
    verdict:  String,
  },
  /// Compare homes side by side.
  Compare { homes: Vec<String> },
  /// Delete a home and everything attached to it.
  DeleteHome { home: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct AppConfig {
  #[serde(default = "default_store_path")]
  store_path:   PathBuf,
  user_id:      Option<Uuid>,
  workspace_id: Option<Uuid>,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/haven/haven.db") }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("HAVEN"))
    .build()
    .context("failed to read config file")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise config")?;

  let store_path = expand_tilde(cli.store.as_deref().unwrap_or(&app_cfg.store_path));
  if let Some(dir) = store_path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating store directory {dir:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::debug!(path = %store_path.display(), "store opened");

  // A stable default identity keeps single-user installs working with no
  // config at all.
  let user_id = cli
    .user
    .or(app_cfg.user_id)
    .unwrap_or(Uuid::from_u128(1));
  let ctx = match app_cfg.workspace_id {
    Some(workspace_id) => SessionContext::new(user_id, workspace_id),
    None => SessionContext::solo(user_id),
  };

  app::run(Arc::new(store), ctx, cli.command).await
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
