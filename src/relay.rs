use axum::body::Bytes;
use reqwest::{Client, Response};
use tracing::{info, instrument};

use crate::{error::AppError, upstream::headers::RESOLVER_HEADERS};

/// Asks the resolver for a fresh manifest URL of `target`
///
/// # Errors
/// Errors on network error, non-success status or when the resolver answers with nothing
#[instrument(skip(client))]
pub async fn resolve_manifest_url(
    client: &Client,
    resolver_url: &str,
    target: &str,
) -> Result<String, AppError> {
    let res = client
        .get(resolver_url)
        .query(&[("url", target)])
        .headers(RESOLVER_HEADERS.clone())
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(AppError::Resolver)?;

    let body = res.text().await.map_err(AppError::Resolver)?;
    let url = body.trim();
    if url.is_empty() {
        return Err(AppError::EmptyResolvedUrl);
    }

    info!("Resolved manifest URL: {url}");
    Ok(url.to_string())
}

/// Fetches the resolved manifest without any extra headers
///
/// # Errors
/// Errors on invalid URL, network error or non-success status
#[instrument(skip(client))]
pub async fn fetch_manifest(client: &Client, url: &str) -> Result<Bytes, AppError> {
    client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(AppError::Manifest)?
        .bytes()
        .await
        .map_err(AppError::Manifest)
}

/// Resolves then fetches the manifest for `target`
///
/// # Errors
/// See [`resolve_manifest_url`] and [`fetch_manifest`]
pub async fn relay(client: &Client, resolver_url: &str, target: &str) -> Result<Bytes, AppError> {
    let url = resolve_manifest_url(client, resolver_url, target).await?;
    fetch_manifest(client, &url).await
}
