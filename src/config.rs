use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default model identifier when none is configured.
pub const DEFAULT_MODEL: &str = "medium";

/// Default source collection when none is configured.
pub const DEFAULT_COLLECTION: &str = "https://www.youtube.com/@Matrixdotorg";

/// Default config artifact filename, produced by `batchscribe setup`.
pub const CONFIG_FILENAME: &str = "batchscribe.json";

/// Immutable per-run settings, resolved once at startup and passed read-only to
/// every stage.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (tests, batch jobs) can construct configuration programmatically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Worker threads handed to the transcription collaborator for its own internal
    /// computation. This does not parallelize across files.
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Transcription model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Source collection (playlist/channel) identifier or URL.
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_threads() -> usize {
    num_cpus::get()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            model: default_model(),
            collection: default_collection(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON artifact.
    ///
    /// A missing file resolves to defaults; any present file must parse. Unknown or
    /// absent fields fall back to their defaults, so old artifacts keep working.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the configuration artifact (pretty-printed, trailing newline).
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}
