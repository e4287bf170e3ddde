//! Acquisition stage: fetch source audio for the configured collection.
//!
//! The heavy lifting (item discovery, resumable fragment downloads, retry/skip
//! policy) belongs to the collaborator; this stage wires it to the run's layout
//! and reports what is known to be acquired afterwards.

use std::collections::BTreeSet;

use tracing::info;

use crate::collab::{AcquireRequest, Acquirer};
use crate::config::Config;
use crate::error::Result;
use crate::layout::Layout;
use crate::ledger::Ledger;
use crate::state::{audio_stem, list_audio_files};

/// Drive the acquisition collaborator once for the whole collection.
///
/// Returns the set of acquired item ids: everything currently on disk in the raw
/// directory plus everything recorded in the ledger. The union matters — items
/// archived by earlier runs are gone from disk but must still count as acquired so
/// they are never refetched.
pub fn run(layout: &Layout, acquirer: &impl Acquirer, config: &Config) -> Result<BTreeSet<String>> {
    info!(collection = %config.collection, "acquiring source audio");

    let req = AcquireRequest {
        collection: config.collection.clone(),
        output_dir: layout.raw_dir(),
        ledger_path: layout.ledger_path(),
        live_from_start: true,
    };
    acquirer.acquire(&req)?;

    let mut ids: BTreeSet<String> = list_audio_files(&layout.raw_dir())?
        .iter()
        .map(|name| audio_stem(name).to_string())
        .collect();
    ids.extend(Ledger::new(layout.ledger_path()).load()?);

    info!(count = ids.len(), "acquisition complete");
    Ok(ids)
}
