//! Many pictures in one call.
//!
//! A batch is a JSON array of entries, each a handle plus options that
//! overlay a shared base (stock defaults, preset file, command-line flags):
//!
//! ```json
//! [
//!   {"handle": "seW1thvcR1aQBfOCF8bX", "options": {"width": "768px"}},
//!   {"handle": {"srcHandle": "abc", "apiKey": "KEY"}}
//! ]
//! ```
//!
//! Entries are independent, so they are built in parallel on the global
//! rayon pool. Output order matches input order, and a failing entry yields
//! an error record rather than aborting the batch.

use crate::config::{ConfigError, json_overlay, resolve_options};
use crate::handle::FileHandle;
use crate::tree::{PictureTree, build_picture_tree};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One input record. `handle` stays raw JSON so a malformed handle fails
/// only its own entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchEntry {
    pub handle: serde_json::Value,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Result for one entry: the tree, or the reason it could not be built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Tree(PictureTree),
    Failed { error: String },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

#[derive(Error, Debug)]
enum EntryError {
    #[error(transparent)]
    Options(#[from] ConfigError),
    #[error(transparent)]
    Picture(#[from] crate::error::PictureError),
}

/// Parse a batch file's content.
pub fn parse_batch(json: &str) -> Result<Vec<BatchEntry>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Build every entry on top of `base`, preserving order.
pub fn run_batch(base: &toml::Value, entries: &[BatchEntry]) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = entries
        .par_iter()
        .map(|entry| match build_entry(base, entry) {
            Ok(tree) => BatchOutcome::Tree(tree),
            Err(e) => BatchOutcome::Failed {
                error: e.to_string(),
            },
        })
        .collect();
    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    tracing::debug!(entries = entries.len(), failed, "batch complete");
    outcomes
}

fn build_entry(base: &toml::Value, entry: &BatchEntry) -> Result<PictureTree, EntryError> {
    let handle = FileHandle::try_from(&entry.handle)?;
    let overlay = match &entry.options {
        serde_json::Value::Null => None,
        options => Some(json_overlay(options)?),
    };
    let options = resolve_options(base.clone(), overlay)?;
    Ok(build_picture_tree(&handle, &options)?)
}
