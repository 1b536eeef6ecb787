#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::Config;
use server::AppState;
use util::{init_http_client, spawn_ct_watcher};

pub mod aggregator;
pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod upstream;
pub mod util;

#[cfg(test)]
mod test_util;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    info!(
        "Aggregating {} with {:?} validation, {} parallel fetches",
        config.channel_list_url,
        config.validation,
        config.fetch_concurrency()
    );
    info!(
        "Relaying {} through {}",
        config.relay_target_for(&config.relay_id),
        config.resolver_url
    );

    let client = init_http_client(config.timeout())?;
    let ct = CancellationToken::new();

    spawn_ct_watcher(ct.clone());

    server::serve(
        AppState {
            client,
            config: Arc::new(config),
        },
        ct,
    )
    .await?;

    info!("All done successfully!");

    Ok(())
}
