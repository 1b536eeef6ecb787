use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{aggregator, config::Config, error::AppError, relay};

/// Number of channel entries dropped as malformed or by validation
pub static SKIPPED_CHANNELS_HEADER: HeaderName = HeaderName::from_static("x-skipped-channels");

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    pub id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(channels_handler))
        .route("/channels", get(channels_handler))
        .route("/manifest.mpd", get(relay_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn response_headers(content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

/// Serves every listed channel paired with its freshly fetched manifest
async fn channels_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let config = &state.config;
    let entries = aggregator::fetch_channel_list(&state.client, &config.channel_list_url).await?;

    let aggregate = aggregator::aggregate(
        &state.client,
        entries,
        config.validation,
        config.fetch_concurrency(),
    )
    .await;

    let body = serde_json::to_string_pretty(&aggregate.records)?;

    let mut headers = response_headers("application/json");
    headers.insert(SKIPPED_CHANNELS_HEADER.clone(), aggregate.skipped.into());

    Ok((headers, body).into_response())
}

/// Serves one freshly resolved manifest, `?id=` picking the channel
async fn relay_handler(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
) -> Result<Response, AppError> {
    let config = &state.config;
    let id = query.id.as_deref().unwrap_or(&config.relay_id);
    let target = config.relay_target_for(id);

    let manifest = relay::relay(&state.client, &config.resolver_url, &target).await?;

    Ok((response_headers("application/dash+xml"), manifest).into_response())
}

/// Binds the configured address and serves until `ct` is cancelled
///
/// # Errors
/// Errors when the address cannot be bound or the server fails
pub async fn serve(state: AppState, ct: CancellationToken) -> Result<()> {
    let addr = state.config.bind;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Binding HTTP server on {addr}"))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
            info!("Shutting down HTTP server");
        })
        .await
        .context("Running HTTP server")
}
