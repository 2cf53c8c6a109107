//! JSONL helpers: strict line-oriented readers for the corpus files.
//!
//! Three row shapes are read:
//! - [`crate::ApiRecord`]  → `records.jsonl`
//! - [`VectorMapRow`]      → `vector_map.jsonl`
//! - [`VectorRow`]         → `index/<facet>.jsonl`
//!
//! Empty lines are skipped. Any malformed row fails the whole load with its
//! line number; a half-loaded corpus is worse than none.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::errors::IndexError;

/// `(index, vector_id) → doc_id` association.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VectorMapRow {
    pub index: String,
    pub vector_id: u64,
    pub doc_id: String,
}

/// One stored vector of a flat index.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VectorRow {
    pub vector_id: u64,
    pub vector: Vec<f32>,
}

/// Reads a JSONL file strictly into `T`.
///
/// # Errors
/// - [`IndexError::Io`] if the file cannot be read.
/// - [`IndexError::Parse`] on the first malformed row.
pub fn read_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, IndexError> {
    let path = path.as_ref();
    info!("Reading JSONL: {:?}", path);
    let file = File::open(path)?;
    let out = read_jsonl_from(BufReader::new(file), &path.display().to_string())?;
    debug!("Loaded {} rows from {:?}", out.len(), path);
    Ok(out)
}

/// Same as [`read_jsonl`] over any buffered reader; `label` names the source in errors.
pub fn read_jsonl_from<T, R>(reader: R, label: &str) -> Result<Vec<T>, IndexError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str::<T>(&line).map_err(|e| IndexError::Parse {
            file: label.to_string(),
            line: i + 1,
            reason: e.to_string(),
        })?;
        out.push(row);
    }
    Ok(out)
}
