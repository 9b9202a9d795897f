/// Failure reported by, or while talking to, the mapping provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {message}")]
    Status { status: String, message: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("no APs available")]
    NoAccessPoints,
    #[error("ap row incomplete")]
    IncompleteAccessPoint,
    #[error("invalid channel in ap row {row:?}: {source}")]
    InvalidChannel {
        row: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("no address found for location")]
    NoAddress,
    #[error("no suitable place found")]
    NoSuitablePlace,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
