// File discovery for reconcile

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::constants::{EXPORT_MANIFEST_FILENAME, HOUSEKEEPING_FILENAMES, METADATA_EXTENSION};
use crate::error::{ReconcileError, Result};

/// A discovered media file. Ordered and deduplicated by path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaFile {
    pub path: PathBuf,
    pub extension: String,
}

impl MediaFile {
    pub fn new(path: PathBuf) -> Self {
        let extension = lowercase_extension(&path);
        Self { path, extension }
    }
}

/// Everything found under the input root.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub media: BTreeSet<MediaFile>,
    pub records: BTreeSet<PathBuf>,
}

/// How a single file is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Media,
    Metadata,
    Ignored,
}

/// Walk `input_dir` and split regular files into media and sidecar records.
pub fn scan_input(input_dir: &Path) -> Result<ScanResult> {
    if !input_dir.is_dir() {
        return Err(ReconcileError::InvalidPath(format!(
            "Input directory does not exist: {}",
            input_dir.display()
        )));
    }

    let root = input_dir.canonicalize()?;
    let mut result = ScanResult::default();

    for entry in WalkDir::new(&root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match classify(path) {
            FileKind::Media => {
                result.media.insert(MediaFile::new(path.to_path_buf()));
            }
            FileKind::Metadata => {
                result.records.insert(path.to_path_buf());
            }
            FileKind::Ignored => {
                log::debug!("Ignoring {}", path.display());
            }
        }
    }

    log::info!(
        "Discovered {} media files and {} sidecars under {}",
        result.media.len(),
        result.records.len(),
        root.display()
    );

    Ok(result)
}

/// Classify a file by name
pub fn classify(path: &Path) -> FileKind {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return FileKind::Media,
    };

    if HOUSEKEEPING_FILENAMES.contains(&name) || name == EXPORT_MANIFEST_FILENAME {
        return FileKind::Ignored;
    }

    if lowercase_extension(path) == METADATA_EXTENSION {
        FileKind::Metadata
    } else {
        FileKind::Media
    }
}

/// Lowercase extension without the dot, empty if none
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
