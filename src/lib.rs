//! `batchscribe` — an idempotent batch pipeline for acquiring, normalizing, and
//! transcribing audio collections.
//!
//! This crate provides:
//! - A filesystem-as-state-machine orchestration model: each stage decides what is
//!   left to do purely from directory membership, so an interrupted run resumes
//!   safely without redoing completed work
//! - Stage drivers with per-item failure isolation and atomic output promotion
//! - Pluggable external-collaborator traits with process-backed implementations
//!   (`yt-dlp`, `ffmpeg-normalize`, whisper.cpp CLI)
//! - Batch duration reporting as a histogram image
//!
//! The library is designed to be used by both the bundled CLI and programmatic
//! callers, with an emphasis on re-runnability and minimal surprises.

// High-level API (most consumers should start here).
pub mod config;
pub mod pipeline;

// Filesystem layout and state inspection.
pub mod artifact;
pub mod layout;
pub mod ledger;
pub mod state;

// Stage drivers.
pub mod acquire;
pub mod archive;
pub mod normalize;
pub mod transcribe;

// External collaborator interfaces and process-backed implementations.
pub mod collab;
pub mod tools;

// Batch reporting.
pub mod report;

// Environment bootstrap.
pub mod setup;

// Error handling, run summaries, and logging configuration.
pub mod error;
pub mod logging;
pub mod summary;

pub use error::{Error, Result};
pub use pipeline::Pipeline;
