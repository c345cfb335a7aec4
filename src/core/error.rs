use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installer.
/// Every module returns `Result<T, InstallerError>`; every variant is fatal
/// for the run.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Maven ───────────────────────────────────────────
    #[error("Malformed Maven coordinate: {0:?}")]
    MalformedCoordinate(String),

    // ── Metadata ────────────────────────────────────────
    #[error("Minecraft version {0} not found in version manifest")]
    VersionNotFound(String),

    #[error("Invalid metadata from {url}: {reason}")]
    InvalidMetadata { url: String, reason: String },

    #[error("Loader API returned no stable release")]
    NoStableLoaderRelease,

    #[error("Invalid loader library manifest from {url}: {reason}")]
    InvalidLibraryManifest { url: String, reason: String },

    // ── Archive ─────────────────────────────────────────
    #[error("Failed to copy {entry:?} from {archive:?}: {reason}")]
    ArchiveCopy {
        archive: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Config ──────────────────────────────────────────
    #[error("Invalid installer config at {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl InstallerError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallerError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for transport-level failures (connection, TLS, HTTP status).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            InstallerError::Http(_) | InstallerError::DownloadFailed { .. }
        )
    }
}
