use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The remote channel-list document, `{ "channels": [...] }`
///
/// Entries stay raw so a malformed one only loses that channel
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelList {
    pub channels: Vec<Value>,
}

/// One channel as listed upstream
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDescriptor {
    pub name: String,
    pub fetch_url: String,
    pub thumb: Option<String>,
    pub kid: Option<String>,
    pub key: Option<String>,
}

/// A channel paired with the manifest body fetched from its `fetch_url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    pub mpd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ChannelRecord {
    #[must_use]
    pub fn new(channel: ChannelDescriptor, mpd: String) -> Self {
        Self {
            name: channel.name,
            thumb: channel.thumb,
            mpd,
            kid: channel.kid,
            key: channel.key,
        }
    }
}
