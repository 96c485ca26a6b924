use thiserror::Error;

/// Failures talking to the stats provider. The orchestrator treats any of
/// these as "no data for this player"; a search with no match is `Ok(None)`,
/// not an error.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider json: {0}")]
    Json(#[from] serde_json::Error),
}
