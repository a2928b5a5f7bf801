use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider signalled rate-limiting (HTTP 429). Distinguished from
    /// other failures because its recovery is a long cooldown, not a quick retry.
    #[error("Rate-limited by the trends provider.")]
    Throttled,

    #[error("The explore response contained no usable {0} widget.")]
    MissingWidget(&'static str),

    #[error("Unexpected provider payload: {0}")]
    UnexpectedPayload(&'static str),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
