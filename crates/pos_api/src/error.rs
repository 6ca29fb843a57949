#[derive(Debug, thiserror::Error)]
pub enum PosApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid connection settings: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PosApiError>;
