use anyhow::{Context, Result, ensure};
use futures_util::{StreamExt as _, stream};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::ValidationPolicy,
    error::AppError,
    upstream::{
        headers::BROWSER_HEADERS,
        structs::{ChannelDescriptor, ChannelList, ChannelRecord},
    },
    util::truncate_string,
};

/// Marker every DASH manifest body contains
pub const MPD_MARKER: &str = "<MPD";

/// Channels that made it into the output, in channel-list order
#[derive(Debug, Default)]
pub struct Aggregate {
    pub records: Vec<ChannelRecord>,
    /// Entries dropped as malformed or by validation
    pub skipped: usize,
}

#[must_use]
pub fn is_manifest(body: &str) -> bool {
    body.contains(MPD_MARKER)
}

impl ValidationPolicy {
    /// Decides what manifest, if any, a channel is emitted with
    ///
    /// Returns `Err` with the reason when the channel must be dropped
    pub fn admit(self, fetched: Result<String>) -> Result<String> {
        match (self, fetched) {
            (Self::Strict, Ok(body)) => {
                ensure!(
                    is_manifest(&body),
                    "Body is not an MPD document: {:?}",
                    truncate_string(&body, 64)
                );
                Ok(body)
            }
            (Self::Strict, Err(e)) => Err(e),
            (Self::Permissive, Ok(body)) => Ok(body),
            (Self::Permissive, Err(e)) => {
                debug!("Emitting empty manifest after failed fetch: {e:#}");
                Ok(String::new())
            }
        }
    }
}

/// Fetches the channel-list document
///
/// Entries are returned undecoded, see [`aggregate`]
///
/// # Errors
/// Errors on network error, non-success status or when the document has no `channels` array
#[instrument(skip(client))]
pub async fn fetch_channel_list(client: &Client, url: &str) -> Result<Vec<Value>, AppError> {
    let res = client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(AppError::ChannelList)?;

    let list = res
        .json::<ChannelList>()
        .await
        .map_err(AppError::ChannelList)?;
    info!("Channel list holds {} channels", list.channels.len());

    Ok(list.channels)
}

/// Fetches a single channel's manifest body as a browser would
///
/// The response status is deliberately ignored, the body decides validity
///
/// # Errors
/// Errors on network error or when the body cannot be read
#[instrument(skip(client))]
pub async fn fetch_channel_manifest(client: &Client, fetch_url: &str) -> Result<String> {
    let res = client
        .get(fetch_url)
        .headers(BROWSER_HEADERS.clone())
        .send()
        .await
        .context("Fetching channel manifest")?;

    debug!("Channel source answered {}", res.status());

    res.text().await.context("Reading channel manifest body")
}

/// Fetches every channel's manifest, `concurrency` at a time, and keeps those the
/// policy admits. Output order follows `entries`.
///
/// Entries that are not a valid channel descriptor are skipped under every policy.
pub async fn aggregate(
    client: &Client,
    entries: Vec<Value>,
    policy: ValidationPolicy,
    concurrency: usize,
) -> Aggregate {
    let fetched = stream::iter(entries.into_iter().enumerate())
        .map(|(index, entry)| async move {
            let channel = serde_json::from_value::<ChannelDescriptor>(entry)
                .with_context(|| format!("Malformed channel entry #{index}"))?;
            let body = fetch_channel_manifest(client, &channel.fetch_url).await;
            anyhow::Ok((channel, body))
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut aggregate = Aggregate::default();
    for outcome in fetched {
        let (channel, body) = match outcome {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Skipping channel: {e:#}");
                aggregate.skipped += 1;
                continue;
            }
        };

        match policy.admit(body) {
            Ok(mpd) => aggregate.records.push(ChannelRecord::new(channel, mpd)),
            Err(e) => {
                warn!("Skipping channel {:?}: {e:#}", channel.name);
                aggregate.skipped += 1;
            }
        }
    }

    info!(
        "Aggregated {} channels, skipped {}",
        aggregate.records.len(),
        aggregate.skipped
    );
    aggregate
}
