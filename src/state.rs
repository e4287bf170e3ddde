//! Stage completion checks, computed from filesystem evidence alone.
//!
//! Every stage filters its work list through these predicates before invoking its
//! (expensive) external collaborator. The rules:
//! - acquired: raw file exists, or the id is in the acquisition ledger
//! - normalized: normalized file exists
//! - transcribed: *all* required artifact formats exist for the id
//!
//! Each check is a pure function of current filesystem state — nothing is cached, so
//! a check can never report stale results after another stage (or a previous run)
//! has moved files around.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::artifact::REQUIRED_FORMATS;
use crate::error::{Error, Result};
use crate::layout::{AUDIO_EXT, Layout};
use crate::ledger::Ledger;

/// One pipeline phase with its own completion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquisition,
    Normalization,
    Transcription,
}

/// Read-only view over a run's filesystem state.
///
/// Borrowing the [`Layout`] keeps this cheap to construct wherever a stage needs it;
/// there is deliberately no owned state that could go stale.
#[derive(Debug, Clone, Copy)]
pub struct StageState<'a> {
    layout: &'a Layout,
}

impl<'a> StageState<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Whether work for `id` at `stage` is already complete.
    pub fn is_complete(&self, id: &str, stage: Stage) -> Result<bool> {
        match stage {
            Stage::Acquisition => {
                let raw = self.layout.raw_dir().join(format!("{id}.{AUDIO_EXT}"));
                if raw.is_file() {
                    return Ok(true);
                }
                Ledger::new(self.layout.ledger_path()).contains(id)
            }
            Stage::Normalization => {
                let normalized = self
                    .layout
                    .normalized_dir()
                    .join(format!("{id}.{AUDIO_EXT}"));
                Ok(normalized.is_file())
            }
            Stage::Transcription => {
                let output_dir = self.layout.output_dir();
                Ok(REQUIRED_FORMATS
                    .iter()
                    .all(|format| format.path_for(&output_dir, id).is_file()))
            }
        }
    }

    /// Raw audio filenames that have no same-named counterpart in the normalized
    /// directory — the normalization work list.
    pub fn pending_normalization(&self) -> Result<Vec<String>> {
        let raw = list_audio_files(&self.layout.raw_dir())?;
        let normalized: BTreeSet<String> =
            list_audio_files(&self.layout.normalized_dir())?.into_iter().collect();

        Ok(raw
            .into_iter()
            .filter(|name| !normalized.contains(name))
            .collect())
    }

    /// Normalized audio filenames whose artifact set is incomplete — the
    /// transcription work list. A partial artifact set counts as not done.
    pub fn pending_transcription(&self) -> Result<Vec<String>> {
        let normalized = list_audio_files(&self.layout.normalized_dir())?;

        let mut pending = Vec::new();
        for name in normalized {
            let id = audio_stem(&name);
            if !self.is_complete(id, Stage::Transcription)? {
                pending.push(name);
            }
        }
        Ok(pending)
    }
}

/// List the audio filenames (not paths) in `dir`, sorted for deterministic order.
///
/// A missing or unreadable directory is an error: if we cannot scan, we cannot tell
/// "done" from "not done", and guessing either way would corrupt the run.
pub fn list_audio_files(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Scan {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::Scan {
            dir: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if Path::new(name)
            .extension()
            .is_some_and(|ext| ext == AUDIO_EXT)
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// The item id for an audio filename (`ep1.wav` -> `ep1`).
pub fn audio_stem(filename: &str) -> &str {
    filename.strip_suffix(&format!(".{AUDIO_EXT}")).unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactFormat;

    fn layout() -> anyhow::Result<(tempfile::TempDir, Layout)> {
        let tmp = tempfile::tempdir()?;
        let layout = Layout::new(tmp.path());
        layout.ensure()?;
        Ok((tmp, layout))
    }

    fn touch(path: &Path) -> anyhow::Result<()> {
        fs::write(path, b"")?;
        Ok(())
    }

    #[test]
    fn acquisition_complete_via_file_or_ledger() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        let state = StageState::new(&layout);

        assert!(!state.is_complete("ep1", Stage::Acquisition)?);

        touch(&layout.raw_dir().join("ep1.wav"))?;
        assert!(state.is_complete("ep1", Stage::Acquisition)?);

        // An id only in the ledger also counts, even with no file on disk.
        Ledger::new(layout.ledger_path()).record("ep2")?;
        assert!(state.is_complete("ep2", Stage::Acquisition)?);
        Ok(())
    }

    #[test]
    fn transcription_requires_all_artifact_formats() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        let state = StageState::new(&layout);
        let out = layout.output_dir();

        touch(&ArtifactFormat::Text.path_for(&out, "ep1"))?;
        touch(&ArtifactFormat::Srt.path_for(&out, "ep1"))?;
        assert!(!state.is_complete("ep1", Stage::Transcription)?);

        touch(&ArtifactFormat::Vtt.path_for(&out, "ep1"))?;
        assert!(state.is_complete("ep1", Stage::Transcription)?);
        Ok(())
    }

    #[test]
    fn pending_normalization_is_a_set_difference_by_filename() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        touch(&layout.raw_dir().join("ep1.wav"))?;
        touch(&layout.raw_dir().join("ep2.wav"))?;
        touch(&layout.raw_dir().join("notes.txt"))?;
        touch(&layout.normalized_dir().join("ep1.wav"))?;

        let state = StageState::new(&layout);
        assert_eq!(state.pending_normalization()?, vec!["ep2.wav"]);
        Ok(())
    }

    #[test]
    fn pending_transcription_counts_partial_artifacts_as_not_done() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        let out = layout.output_dir();
        touch(&layout.normalized_dir().join("ep1.wav"))?;
        touch(&layout.normalized_dir().join("ep2.wav"))?;

        // ep1 fully transcribed; ep2 has only a txt.
        for format in REQUIRED_FORMATS {
            touch(&format.path_for(&out, "ep1"))?;
        }
        touch(&ArtifactFormat::Text.path_for(&out, "ep2"))?;

        let state = StageState::new(&layout);
        assert_eq!(state.pending_transcription()?, vec!["ep2.wav"]);
        Ok(())
    }

    #[test]
    fn missing_directory_is_a_scan_error_not_an_empty_work_list() {
        let err = list_audio_files(Path::new("/nonexistent/batchscribe")).unwrap_err();
        assert!(matches!(err, Error::Scan { .. }));
    }

    #[test]
    fn audio_stem_strips_the_audio_extension_only() {
        assert_eq!(audio_stem("ep1.wav"), "ep1");
        assert_eq!(audio_stem("ep1.tar.wav"), "ep1.tar");
        assert_eq!(audio_stem("README"), "README");
    }
}
