//! roster maintenance binary.
//!
//! Opens the SQLite store named in `roster.toml` (or the path given with
//! `--config`) and runs one repository operation per invocation. Payloads
//! for `create` and `update` are JSON documents matching the domain types;
//! results are printed as pretty JSON on stdout.

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_core::{
  contact::{ContactPatch, NewAddress, NewContact},
  repository::{ContactRepository as _, ListOptions, SortDirection},
};
use roster_store_sqlite::SqliteRepository;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "roster contact store maintenance")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the backing tables (idempotent).
  Init {
    /// Drop and recreate the tables, losing all data.
    #[arg(long)]
    reset: bool,
  },
  /// Insert a handful of demo contacts.
  Seed,
  /// Print every contact with its addresses.
  List {
    /// Column to sort by; any contact or address column.
    #[arg(long)]
    sort: Option<String>,
    /// ASC or DESC.
    #[arg(long)]
    direction: Option<String>,
  },
  /// Print one contact.
  Get { contact_id: i64 },
  /// Create a contact from a JSON payload (`--json` or stdin).
  Create {
    #[arg(long)]
    json: Option<String>,
  },
  /// Patch a contact from a JSON payload (`--json` or stdin).
  Update {
    contact_id: i64,
    #[arg(long)]
    json: Option<String>,
  },
  /// Delete a contact and every address it owns.
  Delete { contact_id: i64 },
}

/// Settings read from the config file and `ROSTER_`-prefixed environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
struct Settings {
  /// Path of the SQLite database file.
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
  PathBuf::from("roster.db")
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
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read config file")?;
  let settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let repo = SqliteRepository::open(&settings.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", settings.store_path)
    })?;

  match cli.command {
    Command::Init { reset } => {
      repo
        .initialize(reset)
        .await
        .context("schema bootstrap failed")?;
      tracing::info!(path = ?settings.store_path, reset, "schema ready");
    }
    Command::Seed => {
      repo
        .initialize(false)
        .await
        .context("schema bootstrap failed")?;
      for input in seed_contacts() {
        let contact = repo.create(input).await?;
        tracing::info!(contact_id = contact.contact_id, "seeded contact");
      }
    }
    Command::List { sort, direction } => {
      let direction = direction
        .as_deref()
        .map(str::parse::<SortDirection>)
        .transpose()?;
      let contacts = repo
        .list_all(ListOptions {
          sort_field: sort,
          direction,
        })
        .await?;
      println!("{}", serde_json::to_string_pretty(&contacts)?);
    }
    Command::Get { contact_id } => {
      let contact = repo.get(contact_id).await?;
      println!("{}", serde_json::to_string_pretty(&contact)?);
    }
    Command::Create { json } => {
      let input: NewContact = serde_json::from_str(&payload(json)?)
        .context("invalid contact payload")?;
      let contact = repo.create(input).await?;
      println!("{}", serde_json::to_string_pretty(&contact)?);
    }
    Command::Update { contact_id, json } => {
      let patch: ContactPatch = serde_json::from_str(&payload(json)?)
        .context("invalid patch payload")?;
      let contact = repo.update(contact_id, patch).await?;
      println!("{}", serde_json::to_string_pretty(&contact)?);
    }
    Command::Delete { contact_id } => {
      repo.delete(contact_id).await?;
      tracing::info!(contact_id, "deleted contact");
    }
  }

  Ok(())
}

/// Inline `--json` payload, or the whole of stdin when absent.
fn payload(json: Option<String>) -> anyhow::Result<String> {
  if let Some(json) = json {
    return Ok(json);
  }
  let mut buffer = String::new();
  std::io::stdin()
    .read_to_string(&mut buffer)
    .context("failed to read payload from stdin")?;
  Ok(buffer)
}

/// Demo rows, in the spirit of the fixtures the service used to seed at
/// startup.
fn seed_contacts() -> Vec<NewContact> {
  vec![
    NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![NewAddress {
        city: Some("Reno".into()),
        province: Some("NV".into()),
        ..Default::default()
      }],
      ..Default::default()
    },
    NewContact {
      first_name: "Bo".into(),
      last_name: "Reyes".into(),
      middle_name: Some("M".into()),
      ..Default::default()
    },
    NewContact {
      first_name: "Cleo".into(),
      last_name: "Okafor".into(),
      addresses: vec![
        NewAddress {
          city: Some("Lagos".into()),
          country: Some("NG".into()),
          ..Default::default()
        },
        NewAddress {
          city: Some("Abuja".into()),
          country: Some("NG".into()),
          ..Default::default()
        },
      ],
      ..Default::default()
    },
  ]
}
