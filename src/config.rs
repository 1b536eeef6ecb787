use std::{net::SocketAddr, time::Duration};

use clap::{Parser, ValueEnum};
use url::form_urlencoded;

const DEFAULT_CHANNEL_LIST_URL: &str =
    "https://raw.githubusercontent.com/cricstreamz745/Web-Iptv/refs/heads/main/nz.json";
const DEFAULT_RESOLVER_URL: &str = "https://mpdchecker.webiptv.site/output.php";
const DEFAULT_RELAY_TARGET: &str = "https://webiptv.site/skynz.php?id={id}";

/// Placeholder in `--relay-target` replaced by the channel identifier
pub const RELAY_ID_PLACEHOLDER: &str = "{id}";

/// Serves aggregated channel manifests and relays fresh MPD documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "MPD_RELAY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Remote JSON document listing the channels to aggregate
    #[arg(long, env = "MPD_RELAY_CHANNEL_LIST_URL", default_value = DEFAULT_CHANNEL_LIST_URL)]
    pub channel_list_url: String,

    /// What to do with channels whose manifest could not be fetched or is not an MPD
    #[arg(
        long,
        env = "MPD_RELAY_VALIDATION",
        value_enum,
        default_value_t = ValidationPolicy::Strict
    )]
    pub validation: ValidationPolicy,

    /// The amount of channel manifests fetched in parallel
    #[arg(long, env = "MPD_RELAY_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    /// Timeout of every outbound request, in seconds
    #[arg(long, env = "MPD_RELAY_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Endpoint turning a channel page URL into a fresh manifest URL
    #[arg(long, env = "MPD_RELAY_RESOLVER_URL", default_value = DEFAULT_RESOLVER_URL)]
    pub resolver_url: String,

    /// Channel page handed to the resolver; `{id}` is replaced by the channel identifier
    #[arg(long, env = "MPD_RELAY_TARGET", default_value = DEFAULT_RELAY_TARGET)]
    pub relay_target: String,

    /// Channel identifier relayed when the request does not name one
    #[arg(long, env = "MPD_RELAY_ID", default_value = "219026")]
    pub relay_id: String,
}

impl Config {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parallelism used for channel fetches, never below one
    #[must_use]
    pub fn fetch_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// The channel page URL the resolver is asked about
    ///
    /// `id` is percent-encoded so it cannot add query parameters of its own
    #[must_use]
    pub fn relay_target_for(&self, id: &str) -> String {
        let id = form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>();
        self.relay_target.replace(RELAY_ID_PLACEHOLDER, &id)
    }
}

/// Validation applied to every fetched channel manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ValidationPolicy {
    /// Drop channels whose fetch failed or whose body is not an MPD document
    #[default]
    Strict,
    /// Emit every channel; failed fetches carry an empty manifest
    Permissive,
}
