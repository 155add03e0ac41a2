use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why an artifact could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvableReason {
    /// Cache miss while offline; remotes were never inspected.
    Offline,
    /// Every configured remote failed (or none were configured).
    ExhaustedRemotes,
}

impl fmt::Display for UnresolvableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvableReason::Offline => write!(f, "offline and not cached"),
            UnresolvableReason::ExhaustedRemotes => write!(f, "exhausted remotes"),
        }
    }
}

/// Central error type for the crate.
/// Every module returns `Result<T, ResolverError>`.
#[derive(Debug, Error)]
pub enum ResolverError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Download returned an empty body: {url}")]
    EmptyBody { url: String },

    // ── Coordinates ─────────────────────────────────────
    #[error("Invalid Maven coordinate '{coordinate}': {reason}")]
    InvalidCoordinate { coordinate: String, reason: String },

    // ── Resolution ──────────────────────────────────────
    #[error("Unresolvable artifact {coordinate}: {reason}")]
    Unresolvable {
        coordinate: String,
        reason: UnresolvableReason,
    },

    // ── Routing ─────────────────────────────────────────
    #[error("Invalid resource location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("A scheme prefix is required: {0}")]
    MissingScheme(String),

    #[error("No loader for prefix: {0}")]
    NoLoader(String),

    #[error("At least one resource loader is required")]
    NoLoadersConfigured,

    // ── Configuration ───────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolverError {
    /// True for cache misses that could not be satisfied remotely.
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, ResolverError::Unresolvable { .. })
    }

    /// The unresolvable reason, if this is an [`ResolverError::Unresolvable`].
    pub fn unresolvable_reason(&self) -> Option<UnresolvableReason> {
        match self {
            ResolverError::Unresolvable { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type ResolverResult<T> = Result<T, ResolverError>;
