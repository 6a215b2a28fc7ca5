pub mod batch;
pub mod cli;
pub mod data;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod show;
pub mod source;
pub mod store;
pub mod sync;

use std::{env, sync::OnceLock};

use anyhow::{Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, ShowArgs, UploadArgs},
    store::{MemoryStore, RestStore},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_sync", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    match cli.command {
        Commands::Upload(args) => handle_upload(&args),
        Commands::Show(args) => handle_show(&args),
    }
}

fn handle_upload(args: &UploadArgs) -> Result<()> {
    info!("Reading '{}'", args.input.display());
    let raw = source::read_table(
        &args.input,
        &source::SourceOptions {
            delimiter: args.delimiter,
            encoding: args.input_encoding.clone(),
        },
    )?;
    info!(
        "Parsed {} data row(s) across {} column(s)",
        raw.rows.len(),
        raw.headers.len()
    );

    let outcome = if args.dry_run {
        let store = MemoryStore::new();
        sync::run_upload(&store, &args.table, &raw, args.batch_size)?
    } else {
        let store = connect_store(args.store_url.as_deref(), args.store_key.as_deref())?;
        sync::run_upload(&store, &args.table, &raw, args.batch_size)?
    };
    info!(
        "{} record(s) stored in '{}' across {} batch(es)",
        outcome.inserted, args.table, outcome.batches
    );
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<()> {
    let store = connect_store(args.store_url.as_deref(), args.store_key.as_deref())?;
    show::execute(&store, &args.table)?;
    Ok(())
}

fn connect_store(url: Option<&str>, key: Option<&str>) -> Result<RestStore> {
    let url = url.ok_or_else(|| anyhow!("missing store URL (--store-url or SHEET_STORE_URL)"))?;
    let key = key.ok_or_else(|| anyhow!("missing store key (--store-key or SHEET_STORE_KEY)"))?;
    Ok(RestStore::new(url, key)?)
}
