use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Append-only record of already-acquired item ids.
///
/// The ledger makes acquisition idempotent across runs even after the raw files have
/// been archived away: an id recorded here is never refetched, regardless of what is
/// currently on disk.
///
/// File format: one record per line, either a bare id or `<extractor> <id>` — the
/// latter is what the acquisition tool writes to its own download archive, so we can
/// share the file with it instead of keeping two sources of truth.
///
/// Invariants:
/// - The file only ever grows; records are appended, never rewritten in place.
/// - Reads always hit the file; there is no cached membership set held across calls.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full set of recorded ids.
    ///
    /// A missing ledger file reads as the empty set — the first run starts with no
    /// history, which is not an error.
    pub fn load(&self) -> Result<BTreeSet<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = BTreeSet::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Archive lines are "<extractor> <id>"; bare ids are accepted too.
            let id = line.rsplit(' ').next().unwrap_or(line);
            ids.insert(id.to_string());
        }
        Ok(ids)
    }

    /// Whether `id` has already been recorded.
    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.load()?.contains(id))
    }

    /// Append a record for `id`.
    ///
    /// Uses O_APPEND so a crash mid-run can at worst lose the trailing record, never
    /// corrupt earlier ones.
    pub fn record(&self, id: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{id}")?;
        Ok(())
    }
}
