use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid 24h change {0}%: start price is undefined at or below -100%")]
    InvalidChange(f64),

    #[error("Invalid price input '{0}'")]
    InvalidPrice(String),

    #[error("Unknown asset id '{0}'")]
    UnknownAsset(String),

    #[error("Indicator error: {0}")]
    Indicator(String),
}
