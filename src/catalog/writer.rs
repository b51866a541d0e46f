//! Serialization of the metadata document.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::record::TrackCatalog;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize the catalog and write it in one shot.
///
/// A failed run leaves any previous document untouched because the file is
/// only opened once the JSON has been fully rendered.
pub fn write_catalog(catalog: &TrackCatalog, path: &Path, pretty: bool) -> Result<(), WriteError> {
    let json = if pretty {
        serde_json::to_string_pretty(catalog)?
    } else {
        serde_json::to_string(catalog)?
    };

    fs::write(path, json).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
