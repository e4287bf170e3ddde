//! One-time environment bootstrap.
//!
//! This replaces interactive setup prompts with an explicit, separately invokable
//! command: check the external tools, write the configuration artifact, and
//! optionally run a smoke-test transcription. The run command consumes the artifact
//! and never blocks on input.

use std::path::Path;

use tracing::info;

use crate::artifact::ArtifactFormat;
use crate::collab::{TranscribeRequest, Transcriber};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tools::{WhisperCliTranscriber, probe};

/// External programs the pipeline cannot run without.
pub const REQUIRED_TOOLS: &[&str] = &["yt-dlp", "ffmpeg", "ffmpeg-normalize", "whisper-cli"];

/// Verify every required external tool can be invoked.
///
/// Fails with [`Error::MissingTool`] on the first tool that cannot be spawned, so
/// the caller can exit non-zero before any stage has mutated anything.
pub fn check_dependencies() -> Result<()> {
    for tool in REQUIRED_TOOLS {
        probe(tool)?;
        info!(tool, "found");
    }
    Ok(())
}

/// Run the full bootstrap: dependency check, config artifact, optional smoke test.
pub fn bootstrap(config: &Config, config_path: &Path, smoke_test: Option<&Path>) -> Result<()> {
    check_dependencies()?;

    config.save(config_path)?;
    info!(path = %config_path.display(), "wrote configuration artifact");

    if let Some(sample) = smoke_test {
        run_smoke_test(config, sample)?;
    }
    Ok(())
}

/// Transcribe `sample` into a throwaway directory to prove the model and tool work.
///
/// This can take a few minutes for larger models; it exists so a broken install is
/// discovered at setup time rather than hours into the first real batch.
fn run_smoke_test(config: &Config, sample: &Path) -> Result<()> {
    if !sample.is_file() {
        return Err(Error::msg(format!(
            "smoke-test sample '{}' does not exist",
            sample.display()
        )));
    }

    info!(sample = %sample.display(), model = %config.model, "running smoke-test transcription");

    let scratch = tempfile::tempdir()?;
    let transcriber = WhisperCliTranscriber::default();
    transcriber.transcribe(&TranscribeRequest {
        model: config.model.clone(),
        threads: config.threads,
        language: "en".to_string(),
        input: sample.to_path_buf(),
        output_base: scratch.path().join("smoke"),
        formats: vec![ArtifactFormat::Text],
        entropy_threshold: 3.0,
    })?;

    info!("smoke test passed");
    Ok(())
}
