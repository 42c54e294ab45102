//! # Seed Data Loader
//!
//! Populates a persistent store with the default bakery data without
//! starting the server.
//!
//! ## Usage
//! ```bash
//! # Seed the CSV files in ./data (default)
//! cargo run -p hearth-db --bin seed
//!
//! # Seed a SQLite database
//! cargo run -p hearth-db --bin seed -- --sqlite ./data/hearth.db
//!
//! # Seed CSV files in another directory
//! cargo run -p hearth-db --bin seed -- --csv ./fixtures
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hearth_db::{open_store, seed_defaults, StoreConfig};

fn parse_args() -> anyhow::Result<Option<StoreConfig>> {
    let mut config = StoreConfig::Csv {
        dir: PathBuf::from("./data"),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--csv" => {
                let dir = args.next().context("--csv needs a directory")?;
                config = StoreConfig::Csv { dir: dir.into() };
            }
            "--sqlite" => {
                let path = args.next().context("--sqlite needs a file path")?;
                config = StoreConfig::Sqlite { path: path.into() };
            }
            "--help" | "-h" => {
                println!("Hearth POS Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --csv <DIR>        Seed CSV files in DIR (default: ./data)");
                println!("  --sqlite <PATH>    Seed the SQLite database at PATH");
                println!("  -h, --help         Show this help message");
                return Ok(None);
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    Ok(Some(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hearth_db=info")),
        )
        .init();

    let Some(config) = parse_args()? else {
        return Ok(());
    };

    let store = open_store(&config)
        .await
        .with_context(|| format!("opening {config:?}"))?;

    let report = seed_defaults(store.as_ref()).await.context("seeding store")?;
    if report.is_empty() {
        info!("Nothing to do; delete the data to reseed");
    }

    Ok(())
}
