// Copy media files that have no sidecar into the output directory

use std::path::{Path, PathBuf};
use crate::error::Result;
use super::copy::copy_with_verify;
use super::discover::MediaFile;
use super::naming::unique_preserving_name;

#[derive(Debug, Clone)]
pub struct OrphanCopy {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub copied: bool,
}

/// Copy each orphan under its own name, numbering on collision.
/// Copy failures are logged and reported; running out of names is fatal.
pub fn copy_orphans(orphans: &[MediaFile], output_dir: &Path) -> Result<Vec<OrphanCopy>> {
    let mut results = Vec::with_capacity(orphans.len());

    for orphan in orphans {
        let file_name = orphan
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let dest = unique_preserving_name(output_dir, &file_name)?;

        log::info!("Copying orphan `{}` -> `{}`", orphan.path.display(), dest.display());
        let copied = match copy_with_verify(&orphan.path, &dest) {
            Ok(bytes) => {
                log::info!("Copied {} bytes to {}", bytes, dest.display());
                true
            }
            Err(e) => {
                log::error!("Failed to copy {}: {}", orphan.path.display(), e);
                false
            }
        };

        results.push(OrphanCopy {
            source: orphan.path.clone(),
            dest,
            copied,
        });
    }

    Ok(results)
}
