use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Batchscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Batchscribe's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// The variants map onto the pipeline's failure taxonomy:
/// - `MissingTool` — a required external capability is not installed/invokable. Fatal:
///   the run aborts before any stage mutates anything.
/// - `Scan` — a stage directory could not be read, so an idempotency check is impossible.
///   Fatal for that stage; never treated as "nothing to do".
/// - `Tool` — an external collaborator failed for a single item. Stages contain this
///   variant themselves (log, skip, continue); it never crosses a stage boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("required tool '{0}' was not found; please install it")]
    MissingTool(String),

    #[error("failed to scan stage directory '{}'", dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' exited with {status} for '{}'", input.display())]
    Tool {
        tool: String,
        status: String,
        input: PathBuf,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error may be contained by a stage's per-item loop.
    ///
    /// Everything else (missing tools, unreadable directories, I/O) aborts the stage.
    pub fn is_per_item(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Other(Box::new(err))
    }
}
