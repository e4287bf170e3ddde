//! Process-backed implementations of the collaborator traits.
//!
//! Each implementation wraps one external program:
//! - `yt-dlp` for acquisition
//! - `ffmpeg-normalize` for loudness/sample-rate normalization
//! - a whisper.cpp CLI for transcription
//!
//! Program names/paths are configurable so tests and unusual installs can point at
//! alternates, but the defaults match what `probe` checks for.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::collab::{AcquireRequest, Acquirer, Normalizer, TranscribeRequest, Transcriber};
use crate::error::{Error, Result};

/// Target sample rate for normalized audio, matching what the transcriber expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Bounded parallelism for the acquisition tool's fragment downloads.
const CONCURRENT_FRAGMENTS: u32 = 3;

/// Check that `program` can be invoked at all.
///
/// We spawn `<program> --version` rather than walking `PATH` ourselves so the check
/// matches exactly what a later invocation will do.
pub fn probe(program: &str) -> Result<()> {
    let result = Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(Error::MissingTool(program.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// `yt-dlp`-backed [`Acquirer`].
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    program: String,
}

impl YtDlpAcquirer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlpAcquirer {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl Acquirer for YtDlpAcquirer {
    fn acquire(&self, req: &AcquireRequest) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--format")
            .arg("bestaudio/best")
            .arg("--extract-audio")
            .arg("--audio-format")
            .arg("wav")
            .arg("--output")
            .arg(req.output_dir.join("%(id)s.%(ext)s"))
            .arg("--download-archive")
            .arg(&req.ledger_path)
            .arg("--concurrent-fragments")
            .arg(CONCURRENT_FRAGMENTS.to_string())
            // The tool handles per-item failures itself; we only care whether it ran.
            .arg("--ignore-errors");

        if req.live_from_start {
            cmd.arg("--live-from-start");
        }

        cmd.arg(&req.collection);
        debug!(?cmd, "invoking acquisition tool");

        let status = cmd.status().map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::MissingTool(self.program.clone())
            } else {
                Error::from(err)
            }
        })?;

        // Non-zero here usually means some items were skipped (private, removed,
        // geo-blocked). Those are retried naturally on the next run; the batch goes on.
        if !status.success() {
            warn!(%status, "acquisition tool reported item-level failures");
        }
        Ok(())
    }
}

/// `ffmpeg-normalize`-backed [`Normalizer`].
///
/// Fixed configuration: EBU R128 loudness mode, 16 kHz output sample rate, video
/// streams disabled.
#[derive(Debug, Clone)]
pub struct FfmpegNormalizer {
    program: String,
}

impl FfmpegNormalizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegNormalizer {
    fn default() -> Self {
        Self::new("ffmpeg-normalize")
    }
}

impl Normalizer for FfmpegNormalizer {
    fn normalize(&self, input: &Path, output: &Path) -> Result<()> {
        let output_result = Command::new(&self.program)
            .arg(input)
            .arg("--output")
            .arg(output)
            .arg("--normalization-type")
            .arg("ebu")
            .arg("--sample-rate")
            .arg(TARGET_SAMPLE_RATE.to_string())
            .arg("--video-disable")
            .arg("--force")
            .output();

        let out = output_result.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::MissingTool(self.program.clone())
            } else {
                Error::from(err)
            }
        })?;

        if !out.status.success() {
            debug!(stderr = %String::from_utf8_lossy(&out.stderr), "normalizer stderr");
            return Err(Error::Tool {
                tool: self.program.clone(),
                status: out.status.to_string(),
                input: input.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// whisper.cpp-CLI-backed [`Transcriber`].
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    program: String,
    model_dir: PathBuf,
}

impl WhisperCliTranscriber {
    pub fn new(program: impl Into<String>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            model_dir: model_dir.into(),
        }
    }

    /// Path of the GGML model file for a model identifier.
    pub fn model_path(&self, model: &str) -> PathBuf {
        self.model_dir.join(format!("ggml-{model}.bin"))
    }
}

impl Default for WhisperCliTranscriber {
    fn default() -> Self {
        Self::new("whisper-cli", "models")
    }
}

impl Transcriber for WhisperCliTranscriber {
    fn transcribe(&self, req: &TranscribeRequest) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-m")
            .arg(self.model_path(&req.model))
            .arg("-t")
            .arg(req.threads.to_string())
            .arg("-l")
            .arg(&req.language);

        for format in &req.formats {
            cmd.arg(format!("-o{}", format.extension()));
        }

        cmd.arg("--entropy-thold")
            .arg(req.entropy_threshold.to_string())
            .arg("--file")
            .arg(&req.input)
            .arg("--output-file")
            .arg(&req.output_base);

        debug!(?cmd, "invoking transcription tool");

        // Capture output instead of inheriting: the tool is chatty and the pipeline
        // reports progress through its own log lines.
        let out = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    Error::MissingTool(self.program.clone())
                } else {
                    Error::from(err)
                }
            })?;

        if !out.status.success() {
            debug!(stderr = %String::from_utf8_lossy(&out.stderr), "transcriber stderr");
            return Err(Error::Tool {
                tool: self.program.clone(),
                status: out.status.to_string(),
                input: req.input.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reports_missing_binaries_as_missing_tool() {
        let err = probe("definitely-not-a-real-binary-batchscribe").unwrap_err();
        assert!(matches!(err, Error::MissingTool(name) if name.contains("batchscribe")));
    }

    #[test]
    fn whisper_model_path_uses_ggml_naming() {
        let t = WhisperCliTranscriber::new("whisper-cli", "/opt/models");
        assert_eq!(t.model_path("medium"), Path::new("/opt/models/ggml-medium.bin"));
    }

    #[test]
    fn missing_acquirer_binary_is_fatal() {
        let acquirer = YtDlpAcquirer::new("definitely-not-a-real-binary-batchscribe");
        let req = AcquireRequest {
            collection: "https://example.com/playlist".into(),
            output_dir: PathBuf::from("/tmp"),
            ledger_path: PathBuf::from("/tmp/downloaded.txt"),
            live_from_start: true,
        };
        let err = acquirer.acquire(&req).unwrap_err();
        assert!(matches!(err, Error::MissingTool(_)));
    }
}
