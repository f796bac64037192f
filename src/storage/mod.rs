use std::fs;
use std::path::Path;

use crate::engine::Document;
use crate::error::{Error, Result};
use crate::runner::RunSummary;

/// Read and parse a JSON document.
pub fn load_document(path: &Path) -> Result<Document> {
    let raw = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Document {
        path: path.to_path_buf(),
        value,
    })
}

/// Write the summaries of a pass as pretty-printed JSON.
pub fn save_summary(path: &Path, summaries: &[RunSummary]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let raw = serde_json::to_vec_pretty(summaries).map_err(|e| write_error(e.into()))?;
    fs::write(path, raw).map_err(write_error)
}
