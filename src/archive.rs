//! Archival stage: move fully processed inputs into the backup area.
//!
//! Moving (not copying) is what makes a successful run durable — the files vanish
//! from the directories earlier stages scan, so the next run has nothing left to
//! redo for them.
//!
//! Only items whose transcription is verified complete are moved. An item whose
//! artifacts are missing or partial keeps its raw and normalized files in place,
//! so the normal retry path can still reach it on the next run.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::layout::Layout;
use crate::state::{Stage, StageState, audio_stem, list_audio_files};

/// Move every fully transcribed item's raw and normalized files to backup.
///
/// Returns the number of files moved.
pub fn run(layout: &Layout) -> Result<usize> {
    let state = StageState::new(layout);

    // Union of both working directories: an item may have lost its raw file to an
    // earlier archival pass while its normalized file waited on a retried
    // transcription, or vice versa.
    let mut names: BTreeSet<String> = list_audio_files(&layout.raw_dir())?.into_iter().collect();
    names.extend(list_audio_files(&layout.normalized_dir())?);

    let mut moved = 0;
    for name in names {
        let id = audio_stem(&name);
        if !state.is_complete(id, Stage::Transcription)? {
            debug!(item = %name, "transcription incomplete; leaving in place for retry");
            continue;
        }

        let raw = layout.raw_dir().join(&name);
        if raw.is_file() {
            move_file(&raw, &layout.backup_input_dir().join(&name))?;
            info!(item = %name, "moved raw file to backup");
            moved += 1;
        }

        let normalized = layout.normalized_dir().join(&name);
        if normalized.is_file() {
            move_file(&normalized, &layout.backup_normalized_dir().join(&name))?;
            info!(item = %name, "moved normalized file to backup");
            moved += 1;
        }
    }

    Ok(moved)
}

/// Rename, falling back to copy-then-remove when the backup area is on a
/// different filesystem.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::REQUIRED_FORMATS;

    fn layout() -> anyhow::Result<(tempfile::TempDir, Layout)> {
        let tmp = tempfile::tempdir()?;
        let layout = Layout::new(tmp.path());
        layout.ensure()?;
        Ok((tmp, layout))
    }

    fn add_item(layout: &Layout, id: &str, transcribed: bool) -> anyhow::Result<()> {
        std::fs::write(layout.raw_dir().join(format!("{id}.wav")), b"raw")?;
        std::fs::write(layout.normalized_dir().join(format!("{id}.wav")), b"norm")?;
        if transcribed {
            for format in REQUIRED_FORMATS {
                std::fs::write(format.path_for(&layout.output_dir(), id), b"x")?;
            }
        }
        Ok(())
    }

    #[test]
    fn moves_completed_items_to_backup() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        add_item(&layout, "ep1", true)?;

        let moved = run(&layout)?;
        assert_eq!(moved, 2);

        assert!(!layout.raw_dir().join("ep1.wav").exists());
        assert!(!layout.normalized_dir().join("ep1.wav").exists());
        assert!(layout.backup_input_dir().join("ep1.wav").is_file());
        assert!(layout.backup_normalized_dir().join("ep1.wav").is_file());
        Ok(())
    }

    #[test]
    fn leaves_untranscribed_items_in_place() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        add_item(&layout, "done", true)?;
        add_item(&layout, "failed", false)?;

        let moved = run(&layout)?;
        assert_eq!(moved, 2);

        // The failed item stays reachable by the normal retry path.
        assert!(layout.raw_dir().join("failed.wav").is_file());
        assert!(layout.normalized_dir().join("failed.wav").is_file());
        assert!(!layout.backup_input_dir().join("failed.wav").exists());
        Ok(())
    }

    #[test]
    fn handles_item_with_only_a_normalized_file() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        // Raw was archived on a previous pass; transcription completed since.
        std::fs::write(layout.normalized_dir().join("ep1.wav"), b"norm")?;
        for format in REQUIRED_FORMATS {
            std::fs::write(format.path_for(&layout.output_dir(), "ep1"), b"x")?;
        }

        let moved = run(&layout)?;
        assert_eq!(moved, 1);
        assert!(layout.backup_normalized_dir().join("ep1.wav").is_file());
        Ok(())
    }

    #[test]
    fn archival_is_idempotent() -> anyhow::Result<()> {
        let (_tmp, layout) = layout()?;
        add_item(&layout, "ep1", true)?;

        run(&layout)?;
        let moved_again = run(&layout)?;
        assert_eq!(moved_again, 0);
        Ok(())
    }
}
