//! Error taxonomy for the link engine.
//!
//! Per-source and per-resolution failures are caught at their boundary and
//! converted into empty results or structured failure values; these variants
//! exist so the conversion sites can pattern-match instead of string-matching.
//! Every variant that describes a remote failure retains the offending input
//! (query or URL) for diagnosis.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The shared browser has not been started yet. Callers must fail fast
    /// rather than block waiting for startup.
    #[error("automation driver not initialized")]
    DriverNotReady,

    #[error("navigation timed out for {url}")]
    NavigationTimeout { url: String },

    #[error("no interactive element found on {url}")]
    NoInteractiveElement { url: String },

    /// The resolver does not know this host's protocol. Returned immediately,
    /// before any tier is attempted.
    #[error("unsupported host: {url}")]
    UnsupportedHost { url: String },

    #[error("upstream HTTP {status} for {url}")]
    UpstreamHttp { status: u16, url: String },

    /// The locker-page polling budget ran out without a direct URL surfacing.
    #[error("resolution budget exhausted for {url}")]
    ResolutionExhausted { url: String },

    /// Non-fatal: the candidate is kept with lexical fields only.
    #[error("no catalog match for '{title}'")]
    IdentityNotMatched { title: String },

    /// Targeted extraction named a source that is not in the registry.
    #[error("unknown source: {name}")]
    UnknownSource { name: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Cache(#[from] sqlx::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        // {:#} preserves the full context chain from setup code.
        Self::Browser(format!("{err:#}"))
    }
}
