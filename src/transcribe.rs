//! Transcription stage: produce the full artifact set for every normalized input
//! that does not have one yet.
//!
//! Per-file failure isolation is the most important property of the whole
//! pipeline: a collaborator failure for one item is logged and that item is left
//! incomplete — nothing is promoted into the output directory for it, so a future
//! run retries it — while the batch continues with the next item.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::artifact::REQUIRED_FORMATS;
use crate::collab::{TranscribeRequest, Transcriber};
use crate::config::Config;
use crate::error::Result;
use crate::layout::Layout;
use crate::state::{StageState, audio_stem};
use crate::summary::StageOutcome;

/// Source language tag handed to the transcriber.
const LANGUAGE: &str = "en";

/// Entropy threshold handed to the transcriber to suppress spurious segments
/// during silence.
const ENTROPY_THRESHOLD: f32 = 3.0;

/// Transcribe every normalized input with an incomplete artifact set.
///
/// Artifacts are produced in a staging directory and renamed into `output/` only
/// once the collaborator has succeeded and every required format is present. A
/// partially successful item therefore leaves the output directory untouched and
/// stays on the work list.
pub fn run(layout: &Layout, transcriber: &impl Transcriber, config: &Config) -> Result<StageOutcome> {
    let state = StageState::new(layout);
    let pending = state.pending_transcription()?;
    if pending.is_empty() {
        info!("transcription: nothing to do");
        return Ok(StageOutcome::default());
    }
    info!(count = pending.len(), model = %config.model, "transcribing audio files");

    let output_dir = layout.output_dir();
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(&output_dir)?;

    let mut outcome = StageOutcome::default();
    for name in pending {
        let id = audio_stem(&name).to_string();
        let req = TranscribeRequest {
            model: config.model.clone(),
            threads: config.threads,
            language: LANGUAGE.to_string(),
            input: layout.normalized_dir().join(&name),
            output_base: staging.path().join(&id),
            formats: REQUIRED_FORMATS.to_vec(),
            entropy_threshold: ENTROPY_THRESHOLD,
        };

        match transcriber.transcribe(&req) {
            Ok(()) => {
                if promote_artifacts(staging.path(), &output_dir, &id)? {
                    outcome.completed += 1;
                    info!(item = %id, "transcribed");
                } else {
                    outcome.failed += 1;
                    warn!(item = %id, "transcriber succeeded but artifacts are incomplete; leaving item for retry");
                }
            }
            Err(err) if err.is_per_item() => {
                outcome.failed += 1;
                warn!(item = %id, error = %err, "transcription failed; leaving item for retry");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(outcome)
}

/// Rename every staged artifact for `id` into the output directory.
///
/// Returns `false` without renaming anything if any required format is missing from
/// staging — promoting a partial set would make the completeness check lie on the
/// next run.
fn promote_artifacts(staging: &Path, output_dir: &Path, id: &str) -> Result<bool> {
    let all_present = REQUIRED_FORMATS
        .iter()
        .all(|format| format.path_for(staging, id).is_file());
    if !all_present {
        return Ok(false);
    }

    for format in REQUIRED_FORMATS {
        fs::rename(format.path_for(staging, id), format.path_for(output_dir, id))?;
    }
    Ok(true)
}
