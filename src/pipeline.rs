//! High-level API for running the full batch pipeline.
//!
//! We expose a single entry point (`Pipeline`) that wires the stages together in
//! their fixed order:
//!
//! acquire → report → normalize → transcribe → archive
//!
//! Stages hand nothing to each other in memory except directory paths; each one
//! reads the filesystem state the previous one left behind. That is the core design
//! choice enabling independent resumability: an interrupted run resumes at the
//! first incomplete stage simply by being run again.
//!
//! Failure policy: per-item errors are contained inside each stage driver; any
//! error that escapes a stage is environment-level and aborts the remainder of the
//! run, leaving all completed filesystem state intact.

use tracing::{info, warn};

use crate::acquire;
use crate::archive;
use crate::collab::{Acquirer, Normalizer, Transcriber};
use crate::config::Config;
use crate::error::Result;
use crate::layout::Layout;
use crate::normalize;
use crate::report;
use crate::summary::RunSummary;
use crate::tools::{FfmpegNormalizer, WhisperCliTranscriber, YtDlpAcquirer};
use crate::transcribe;

/// The pipeline controller.
///
/// Owns the run's configuration, layout, and collaborators. Generic over the
/// collaborator traits so tests (and alternative frontends) can substitute fakes;
/// `Pipeline::new` wires up the standard process-backed tools.
///
/// One instance assumes exclusive use of its layout's directories: concurrent runs
/// against the same root are not supported.
pub struct Pipeline<A = YtDlpAcquirer, N = FfmpegNormalizer, T = WhisperCliTranscriber> {
    config: Config,
    layout: Layout,
    acquirer: A,
    normalizer: N,
    transcriber: T,
}

impl Pipeline {
    /// Create a pipeline using the standard external tools.
    pub fn new(config: Config, layout: Layout) -> Self {
        Self::with_collaborators(
            config,
            layout,
            YtDlpAcquirer::default(),
            FfmpegNormalizer::default(),
            WhisperCliTranscriber::default(),
        )
    }
}

impl<A, N, T> Pipeline<A, N, T>
where
    A: Acquirer,
    N: Normalizer,
    T: Transcriber,
{
    /// Create a pipeline with custom collaborators.
    pub fn with_collaborators(
        config: Config,
        layout: Layout,
        acquirer: A,
        normalizer: N,
        transcriber: T,
    ) -> Self {
        Self {
            config,
            layout,
            acquirer,
            normalizer,
            transcriber,
        }
    }

    /// Execute one full pipeline pass.
    pub fn run(&self) -> Result<RunSummary> {
        self.layout.ensure()?;
        info!(root = %self.layout.root().display(), "starting pipeline run");

        let acquired = acquire::run(&self.layout, &self.acquirer, &self.config)?;

        // Reporting is advisory only; a failed report never aborts the batch.
        if let Err(err) = report::generate(&self.layout.raw_dir(), &self.layout.report_path()) {
            warn!(error = %err, "report generation failed; continuing");
        }

        let normalized = normalize::run(&self.layout, &self.normalizer)?;
        let transcribed = transcribe::run(&self.layout, &self.transcriber, &self.config)?;
        let archived = archive::run(&self.layout)?;

        let summary = RunSummary {
            acquired: acquired.len(),
            normalized,
            transcribed,
            archived,
        };
        info!(
            acquired = summary.acquired,
            normalized = summary.normalized.completed,
            normalize_failures = summary.normalized.failed,
            transcribed = summary.transcribed.completed,
            transcribe_failures = summary.transcribed.failed,
            archived = summary.archived,
            "pipeline run complete"
        );
        Ok(summary)
    }

    /// Access the run configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the resolved layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}
