// CLI front-end for the batchscribe pipeline: a one-time `setup` bootstrap and a
// `run` command that executes one full pipeline pass.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use batchscribe::config::{CONFIG_FILENAME, Config};
use batchscribe::layout::Layout;
use batchscribe::pipeline::Pipeline;
use batchscribe::setup;

fn main() -> Result<()> {
    batchscribe::logging::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Setup {
            threads,
            model,
            collection,
            smoke_test,
            config,
        } => {
            let mut cfg = Config::default();
            if let Some(threads) = threads {
                cfg.threads = threads;
            }
            if let Some(model) = model {
                cfg.model = model;
            }
            if let Some(collection) = collection {
                cfg.collection = collection;
            }
            setup::bootstrap(&cfg, &config, smoke_test.as_deref())?;
        }
        Command::Run { root, config } => {
            let cfg = Config::load(&config)?;
            let pipeline = Pipeline::new(cfg, Layout::new(root));
            let summary = pipeline.run()?;

            println!(
                "acquired {} item(s); normalized {} ({} failed); transcribed {} ({} failed); archived {} file(s)",
                summary.acquired,
                summary.normalized.completed,
                summary.normalized.failed,
                summary.transcribed.completed,
                summary.transcribed.failed,
                summary.archived,
            );
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "batchscribe")]
#[command(about = "Acquire, normalize, and transcribe an audio collection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check external tools and write the configuration artifact.
    Setup {
        /// Worker threads for the transcriber (default: all logical CPUs).
        #[arg(long)]
        threads: Option<usize>,

        /// Transcription model identifier.
        #[arg(long)]
        model: Option<String>,

        /// Source collection (playlist/channel) URL.
        #[arg(long)]
        collection: Option<String>,

        /// Optional wav file to transcribe as a smoke test.
        #[arg(long)]
        smoke_test: Option<PathBuf>,

        /// Where to write the configuration artifact.
        #[arg(long, default_value = CONFIG_FILENAME)]
        config: PathBuf,
    },

    /// Execute one full pipeline pass.
    Run {
        /// Root directory holding the working directories.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Configuration artifact to load (missing file means defaults).
        #[arg(long, default_value = CONFIG_FILENAME)]
        config: PathBuf,
    },
}
