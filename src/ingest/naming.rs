// Collision-free output names

use std::path::{Path, PathBuf};
use crate::constants::MAX_NAME_COUNTER;
use crate::error::{ReconcileError, Result};

/// First free `<dir>/<base><ext>` (lower-cased), then `<base>01<ext>` ... `<base>999<ext>`.
/// `ext` may be given with or without its leading dot.
pub fn unique_output_path(dir: &Path, base: &str, ext: &str) -> Result<PathBuf> {
    first_free(dir, base, &dotted(ext), |name| name.to_lowercase())
}

/// Same counter scheme but keeps the original case, for files copied under their own name.
pub fn unique_preserving_name(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let (stem, ext) = super::normalize::split_extension(file_name);
    first_free(dir, stem, ext, |name| name)
}

fn first_free(
    dir: &Path,
    base: &str,
    ext: &str,
    finish: impl Fn(String) -> String,
) -> Result<PathBuf> {
    let candidate = dir.join(finish(format!("{}{}", base, ext)));
    if !candidate.exists() {
        return Ok(candidate);
    }

    for counter in 1..=MAX_NAME_COUNTER {
        let candidate = dir.join(finish(format!("{}{:02}{}", base, counter, ext)));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(ReconcileError::NameCapacity(format!(
        "{}{} in {}",
        base,
        ext,
        dir.display()
    )))
}

fn dotted(ext: &str) -> String {
    if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
