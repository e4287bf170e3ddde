//! Normalization stage: bring every raw input to the canonical sample rate and
//! loudness, one file at a time.
//!
//! Idempotency: the work list is the set difference (by filename) between the raw
//! and normalized directories, so a file already present in the output set is never
//! re-normalized.
//!
//! Atomicity: the collaborator writes into a staging directory inside the
//! destination, and the finished file is renamed into place afterwards. Directory
//! scans can therefore never mistake a partial write for completed work.

use std::fs;

use tracing::{info, warn};

use crate::collab::Normalizer;
use crate::error::Result;
use crate::layout::Layout;
use crate::state::StageState;
use crate::summary::StageOutcome;

/// Normalize every pending raw input.
///
/// A per-item collaborator failure is logged and the item is left un-normalized for
/// retry on a future run; only environment-level errors (missing tool, unreadable
/// directory) abort the stage.
pub fn run(layout: &Layout, normalizer: &impl Normalizer) -> Result<StageOutcome> {
    let state = StageState::new(layout);
    let pending = state.pending_normalization()?;
    if pending.is_empty() {
        info!("normalization: nothing to do");
        return Ok(StageOutcome::default());
    }
    info!(count = pending.len(), "normalizing audio files");

    let normalized_dir = layout.normalized_dir();
    // Staging lives inside the destination so the final rename stays on one
    // filesystem. The scan in `state` ignores it (it is a dot-prefixed directory).
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(&normalized_dir)?;

    let mut outcome = StageOutcome::default();
    for name in pending {
        let input = layout.raw_dir().join(&name);
        let staged = staging.path().join(&name);

        match normalizer.normalize(&input, &staged) {
            Ok(()) => {
                fs::rename(&staged, normalized_dir.join(&name))?;
                outcome.completed += 1;
                info!(item = %name, "normalized");
            }
            Err(err) if err.is_per_item() => {
                outcome.failed += 1;
                warn!(item = %name, error = %err, "normalization failed; leaving item for retry");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use crate::error::Error;

    /// Copies input to output, optionally failing for configured item names.
    struct FakeNormalizer {
        fail_for: Vec<String>,
        invocations: RefCell<Vec<PathBuf>>,
    }

    impl FakeNormalizer {
        fn new(fail_for: &[&str]) -> Self {
            Self {
                fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
                invocations: RefCell::new(Vec::new()),
            }
        }

        fn invocation_count(&self) -> usize {
            self.invocations.borrow().len()
        }
    }

    impl Normalizer for FakeNormalizer {
        fn normalize(&self, input: &Path, output: &Path) -> Result<()> {
            self.invocations.borrow_mut().push(input.to_path_buf());
            let name = input.file_name().unwrap().to_str().unwrap();
            if self.fail_for.iter().any(|f| f == name) {
                return Err(Error::Tool {
                    tool: "fake-normalizer".into(),
                    status: "exit status: 1".into(),
                    input: input.to_path_buf(),
                });
            }
            std::fs::copy(input, output)?;
            Ok(())
        }
    }

    fn layout_with_raw(names: &[&str]) -> anyhow::Result<(tempfile::TempDir, Layout)> {
        let tmp = tempfile::tempdir()?;
        let layout = Layout::new(tmp.path());
        layout.ensure()?;
        for name in names {
            std::fs::write(layout.raw_dir().join(name), b"pcm")?;
        }
        Ok((tmp, layout))
    }

    #[test]
    fn normalizes_every_pending_file() -> anyhow::Result<()> {
        let (_tmp, layout) = layout_with_raw(&["ep1.wav", "ep2.wav"])?;
        let normalizer = FakeNormalizer::new(&[]);

        let outcome = run(&layout, &normalizer)?;
        assert_eq!(outcome, StageOutcome { completed: 2, failed: 0 });
        assert!(layout.normalized_dir().join("ep1.wav").is_file());
        assert!(layout.normalized_dir().join("ep2.wav").is_file());
        assert_eq!(normalizer.invocation_count(), 2);
        Ok(())
    }

    #[test]
    fn second_run_with_no_new_inputs_invokes_nothing() -> anyhow::Result<()> {
        let (_tmp, layout) = layout_with_raw(&["ep1.wav", "ep2.wav"])?;
        run(&layout, &FakeNormalizer::new(&[]))?;

        let second = FakeNormalizer::new(&[]);
        let outcome = run(&layout, &second)?;
        assert_eq!(outcome, StageOutcome::default());
        assert_eq!(second.invocation_count(), 0);
        Ok(())
    }

    #[test]
    fn one_bad_file_does_not_block_the_rest() -> anyhow::Result<()> {
        let (_tmp, layout) = layout_with_raw(&["ep1.wav", "ep2.wav", "ep3.wav"])?;
        let normalizer = FakeNormalizer::new(&["ep2.wav"]);

        let outcome = run(&layout, &normalizer)?;
        assert_eq!(outcome, StageOutcome { completed: 2, failed: 1 });
        assert!(layout.normalized_dir().join("ep1.wav").is_file());
        assert!(!layout.normalized_dir().join("ep2.wav").exists());
        assert!(layout.normalized_dir().join("ep3.wav").is_file());
        Ok(())
    }

    #[test]
    fn failed_item_is_retried_on_the_next_run() -> anyhow::Result<()> {
        let (_tmp, layout) = layout_with_raw(&["ep1.wav", "ep2.wav"])?;
        run(&layout, &FakeNormalizer::new(&["ep2.wav"]))?;

        let retry = FakeNormalizer::new(&[]);
        let outcome = run(&layout, &retry)?;
        assert_eq!(outcome, StageOutcome { completed: 1, failed: 0 });
        assert_eq!(retry.invocation_count(), 1);
        assert!(layout.normalized_dir().join("ep2.wav").is_file());
        Ok(())
    }
}
