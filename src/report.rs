//! Batch summary reporting: a histogram image of audio durations.
//!
//! Reporting is advisory — the pipeline logs and continues if anything in here
//! fails. Durations are read from wav headers via `hound` (no decoding), and the
//! histogram is rasterized directly with the `image` crate. The raster backend has
//! no text support, so the chart carries no axis labels; the image is a quick
//! shape-of-the-batch glance, not a publication figure.

use std::path::Path;

use image::{Rgb, RgbImage};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::error::Result;
use crate::state::list_audio_files;

/// Number of histogram buckets.
const BINS: usize = 50;

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 800;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BAR_COLOR: Rgb<u8> = Rgb([135, 206, 235]);
const AXIS_COLOR: Rgb<u8> = Rgb([221, 221, 221]);

/// Scan `audio_dir`, histogram the file durations, and write a PNG to `output`.
pub fn generate(audio_dir: &Path, output: &Path) -> Result<()> {
    info!("generating duration histogram");

    let durations = scan_durations(audio_dir)?;
    if durations.is_empty() {
        info!("no readable audio files; skipping report");
        return Ok(());
    }

    let counts = bin_durations(&durations, BINS);
    render(&counts, output)?;

    info!(files = durations.len(), report = %output.display(), "report written");
    Ok(())
}

/// Read the duration in seconds of every audio file in `dir`.
///
/// Files with unreadable headers are skipped with a warning; they will still be
/// picked up by the processing stages, which have their own error handling.
fn scan_durations(dir: &Path) -> Result<Vec<f64>> {
    let files = list_audio_files(dir)?;
    let progress = ProgressBar::new(files.len() as u64);

    let mut durations = Vec::with_capacity(files.len());
    for name in &files {
        let path = dir.join(name);
        match hound::WavReader::open(&path) {
            Ok(reader) => {
                let spec = reader.spec();
                durations.push(f64::from(reader.duration()) / f64::from(spec.sample_rate));
            }
            Err(err) => {
                warn!(item = %name, error = %err, "could not read wav header; skipping in report");
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(durations)
}

/// Bucket `durations` into `bins` equal-width counts spanning min..max.
fn bin_durations(durations: &[f64], bins: usize) -> Vec<u32> {
    let mut counts = vec![0u32; bins];
    if durations.is_empty() || bins == 0 {
        return counts;
    }

    let min = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    for &duration in durations {
        let index = if span <= f64::EPSILON {
            0
        } else {
            // The maximum value falls into the last bucket, not one past it.
            (((duration - min) / span) * bins as f64).min(bins as f64 - 1.0) as usize
        };
        counts[index] += 1;
    }
    counts
}

/// Rasterize the bucket counts as a bar chart and save it as a PNG.
fn render(counts: &[u32], output: &Path) -> Result<()> {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let plot_width = WIDTH - 2 * MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;
    let baseline = HEIGHT - MARGIN;
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);

    let slot = plot_width as f64 / counts.len() as f64;
    // 70% bar, 30% gap inside each slot.
    let bar_width = (slot * 0.7).max(1.0) as u32;

    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let bar_height = ((count as f64 / peak as f64) * plot_height as f64).round() as u32;
        let x0 = MARGIN + (i as f64 * slot) as u32;
        for x in x0..(x0 + bar_width).min(WIDTH - MARGIN) {
            for y in (baseline - bar_height)..baseline {
                img.put_pixel(x, y, BAR_COLOR);
            }
        }
    }

    // Baseline axis.
    for x in MARGIN..(WIDTH - MARGIN) {
        img.put_pixel(x, baseline, AXIS_COLOR);
    }

    img.save(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_durations_spreads_values_across_buckets() {
        let counts = bin_durations(&[0.0, 1.0, 2.0, 3.0], 4);
        assert_eq!(counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn bin_durations_puts_max_value_in_last_bucket() {
        let counts = bin_durations(&[0.0, 10.0], 5);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[4], 1);
    }

    #[test]
    fn bin_durations_handles_identical_values() {
        let counts = bin_durations(&[5.0, 5.0, 5.0], 3);
        assert_eq!(counts, vec![3, 0, 0]);
    }

    #[test]
    fn bin_durations_handles_empty_input() {
        assert_eq!(bin_durations(&[], 3), vec![0, 0, 0]);
    }

    #[test]
    fn generate_writes_a_png_for_real_wavs() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        for (name, samples) in [("a.wav", 16_000), ("b.wav", 32_000)] {
            let mut writer = hound::WavWriter::create(tmp.path().join(name), spec)?;
            for _ in 0..samples {
                writer.write_sample(0i16)?;
            }
            writer.finalize()?;
        }

        let report = tmp.path().join("hist.png");
        generate(tmp.path(), &report)?;
        assert!(report.is_file());
        Ok(())
    }

    #[test]
    fn generate_skips_quietly_when_there_is_no_audio() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let report = tmp.path().join("hist.png");
        generate(tmp.path(), &report)?;
        assert!(!report.exists());
        Ok(())
    }
}
