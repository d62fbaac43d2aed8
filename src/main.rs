//! Parts Sync - local parts catalog to WooCommerce
//!
//! Reads priced parts from SQLite and creates or updates the matching
//! WooCommerce products. One run, then exit.

use clap::Parser;
use parts_sync::config::{default_db_path, SyncConfig, WooCredentials};
use parts_sync::{SqlitePartSource, SqliteSignatureStore, SyncRun, WooClient};
use std::path::PathBuf;
use std::time::Duration;

/// Push priced parts from the local catalog to a WooCommerce store
#[derive(Parser, Debug)]
#[command(name = "parts_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Maximum number of parts to read (0 = all)
    #[arg(long, default_value_t = 100)]
    limit: usize,

    /// Plan only, do not call the batch endpoint
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Skip matched parts whose content is unchanged since the last run
    #[arg(long, default_value_t = false)]
    skip_unchanged: bool,

    /// Path to the SQLite parts database
    #[arg(short, long, env = "PARTS_DB", default_value_os_t = default_db_path())]
    database: PathBuf,

    /// WooCommerce REST root, e.g. https://shop.example/wp-json/wc/v3
    #[arg(long, env = "WOO_BASE")]
    base_url: String,

    /// WooCommerce consumer key
    #[arg(long, env = "WOO_CK", hide_env_values = true)]
    consumer_key: String,

    /// WooCommerce consumer secret
    #[arg(long, env = "WOO_CS", hide_env_values = true)]
    consumer_secret: String,

    /// Products per batch request
    #[arg(long, default_value_t = parts_sync::config::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Seconds to wait after a 429 response
    #[arg(long, default_value_t = 2)]
    backoff_secs: u64,
}

impl Args {
    fn to_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(
            &self.base_url,
            WooCredentials {
                consumer_key: self.consumer_key.clone(),
                consumer_secret: self.consumer_secret.clone(),
            },
            self.database.clone(),
        );
        config.batch_size = self.batch_size;
        config.backoff = Duration::from_secs(self.backoff_secs);
        config.skip_unchanged = self.skip_unchanged;
        config
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.to_config();

    if let Err(e) = config.validate() {
        log::error!("{}", e);
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting parts_sync...");
    log::info!("Database path: {}", config.database.display());

    let source = SqlitePartSource::new(&config.database);
    let woo = WooClient::new(&config);
    let mut signatures = SqliteSignatureStore::new(&config.database);

    let mut sync_run = SyncRun::new(&config, &source, &woo);
    if config.skip_unchanged {
        sync_run = sync_run.with_signature_store(&mut signatures);
    }

    let limit = (args.limit > 0).then_some(args.limit);
    match sync_run.run(limit, args.dry_run).await {
        Ok(summary) => {
            if summary.dry_run {
                print_sample("create", &summary.create_sample);
                print_sample("update", &summary.update_sample);
            }
            match serde_json::to_string(&summary) {
                Ok(json) => println!("[done] {}", json),
                Err(_) => println!("[done] {:?}", summary),
            }
        }
        Err(e) => {
            log::error!("Sync failed: {}", e);
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_sample(kind: &str, sample: &[parts_sync::SyncPayload]) {
    match serde_json::to_string_pretty(sample) {
        Ok(json) => println!("[dry-run] sample {} payload: {}", kind, json),
        Err(e) => log::warn!("Could not render {} sample: {}", kind, e),
    }
}
