use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The audio extension every stage scans for.
pub const AUDIO_EXT: &str = "wav";

/// Filename of the acquisition ledger inside the raw directory.
pub const LEDGER_FILENAME: &str = "downloaded.txt";

/// Filename of the duration-histogram report image.
pub const REPORT_FILENAME: &str = "audio_lengths_histogram.png";

/// Resolves every working path of a pipeline run from a single root directory.
///
/// The directory *membership* of each of these paths is the pipeline's only state
/// signal — there is no database or metadata sidecar. Stages communicate purely by
/// leaving files behind for the next stage to scan:
///
/// - `playlist/` — raw acquired audio, plus the ledger file `downloaded.txt`
/// - `playlist_normalized/` — loudness/sample-rate normalized audio
/// - `output/` — transcript artifacts (`<id>.txt`, `<id>.srt`, `<id>.vtt`)
/// - `backup/input/`, `backup/normalized/` — archived inputs after a verified run
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`. No directories are created until [`ensure`].
    ///
    /// [`ensure`]: Layout::ensure
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw acquired audio lands here.
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("playlist")
    }

    /// Normalized audio lands here.
    pub fn normalized_dir(&self) -> PathBuf {
        self.root.join("playlist_normalized")
    }

    /// Transcript artifacts land here.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Archived raw inputs.
    pub fn backup_input_dir(&self) -> PathBuf {
        self.root.join("backup").join("input")
    }

    /// Archived normalized inputs.
    pub fn backup_normalized_dir(&self) -> PathBuf {
        self.root.join("backup").join("normalized")
    }

    /// Append-only ledger of already-acquired item ids.
    pub fn ledger_path(&self) -> PathBuf {
        self.raw_dir().join(LEDGER_FILENAME)
    }

    /// Where the duration-histogram image is written.
    pub fn report_path(&self) -> PathBuf {
        self.root.join(REPORT_FILENAME)
    }

    /// Create every working directory and touch the ledger file.
    ///
    /// Safe to call on every run; existing directories and ledger contents are left alone.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(self.raw_dir())?;
        fs::create_dir_all(self.normalized_dir())?;
        fs::create_dir_all(self.output_dir())?;
        fs::create_dir_all(self.backup_input_dir())?;
        fs::create_dir_all(self.backup_normalized_dir())?;

        // Touch the ledger so the acquisition tool always has an archive to consult.
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ledger_path())?;

        Ok(())
    }
}
