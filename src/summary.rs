/// Per-stage item counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOutcome {
    /// Items whose output was produced and promoted into place.
    pub completed: usize,

    /// Items that failed and were left in place for retry on a future run.
    pub failed: usize,
}

impl StageOutcome {
    /// True when no item failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Top-level summary returned by a full pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Item ids known to be acquired (on disk or in the ledger) after acquisition.
    pub acquired: usize,

    /// Normalization outcome.
    pub normalized: StageOutcome,

    /// Transcription outcome.
    pub transcribed: StageOutcome,

    /// Files moved into the backup area.
    pub archived: usize,
}
