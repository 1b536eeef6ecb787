use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shortens a string to at most `max_length` bytes for log output, ending it with `...`
/// when something was cut.
///
/// Never splits a UTF-8 codepoint.
pub fn truncate_string(string: &str, max_length: usize) -> String {
    if string.len() <= max_length {
        return string.to_string();
    }

    let budget = max_length.saturating_sub(3);
    let end = string
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= budget)
        .last()
        .unwrap_or(0);

    format!("{}...", &string[..end])
}

/// Builds the outbound HTTP client shared by every request handler
///
/// No default headers are set; each upstream call picks its own header bundle.
///
/// # Errors
/// Errors when the TLS backend cannot be initialized
pub fn init_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()
        .context("Building HTTP client")
}

/// Spawn a task that watches for CTRL + C signal and cancels a [`CancellationToken`] when caught
pub fn spawn_ct_watcher(ct: CancellationToken) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Caught CTRL+C signal!");
        ct.cancel();
    });
}
