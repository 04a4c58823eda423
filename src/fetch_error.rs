#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}
