use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures that end an inbound request
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unable to load channel list: {0}")]
    ChannelList(#[source] reqwest::Error),

    #[error("Unable to resolve manifest URL: {0}")]
    Resolver(#[source] reqwest::Error),

    #[error("Resolver returned an empty manifest URL")]
    EmptyResolvedUrl,

    #[error("Unable to fetch manifest: {0}")]
    Manifest(#[source] reqwest::Error),

    #[error("Unable to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ChannelList(_) | Self::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Resolver(e) | Self::Manifest(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Resolver(_) | Self::Manifest(_) | Self::EmptyResolvedUrl => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!("Request failed with {status}: {}", self);

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}
