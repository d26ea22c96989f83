/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),
}
