//! Interfaces for the pipeline's external collaborators.
//!
//! The stage drivers only ever talk to these traits, so the expensive external
//! programs can be swapped for in-memory fakes in tests. The process-backed
//! implementations live in [`crate::tools`].

use std::path::{Path, PathBuf};

use crate::artifact::ArtifactFormat;
use crate::error::Result;

/// Everything the acquisition collaborator needs for one batch fetch.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    /// Source collection (playlist/channel) identifier or URL.
    pub collection: String,

    /// Directory the collaborator writes raw audio into, one file per item id.
    pub output_dir: PathBuf,

    /// Download-archive file the collaborator consults and appends to. Items
    /// recorded here are not refetched even if their files are gone from disk.
    pub ledger_path: PathBuf,

    /// Fetch livestream-style sources from their start rather than from "now",
    /// so a partially-acquired stream can be continued.
    pub live_from_start: bool,
}

/// Fetches source audio for a whole collection.
///
/// Contract: per-item failures are the collaborator's own business (retry/skip);
/// implementations return an error only when they cannot run at all — a missing
/// binary, an unreadable output directory. That single distinction is what lets the
/// acquisition stage treat its collaborator as a black box.
pub trait Acquirer {
    fn acquire(&self, req: &AcquireRequest) -> Result<()>;
}

/// Converts one audio file to the pipeline's canonical sample rate and loudness.
///
/// Invoked once per file so one bad input cannot sink the rest of the batch. The
/// stage driver chooses `output` (a staging path) and performs the final rename
/// itself; implementations just produce the file at the requested location.
pub trait Normalizer {
    fn normalize(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Everything the transcription collaborator needs for one item.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// Model identifier (e.g. `"medium"`).
    pub model: String,

    /// Worker threads for the collaborator's internal computation.
    pub threads: usize,

    /// Source language tag (e.g. `"en"`).
    pub language: String,

    /// Normalized input audio.
    pub input: PathBuf,

    /// Output path *without* extension; one `<output_base>.<ext>` file is expected
    /// per requested format.
    pub output_base: PathBuf,

    /// Formats the collaborator must produce.
    pub formats: Vec<ArtifactFormat>,

    /// Entropy threshold used to suppress spurious segments in silence.
    pub entropy_threshold: f32,
}

/// Transcribes one normalized audio file into the requested artifact formats.
///
/// A failure return means the item's artifacts are missing or partial and the item
/// must stay eligible for retry; the stage driver guarantees nothing partial is
/// promoted into the output directory.
pub trait Transcriber {
    fn transcribe(&self, req: &TranscribeRequest) -> Result<()>;
}
