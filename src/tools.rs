// Locates the exiftool binary.
//
// TAKEOUT_EXIFTOOL_PATH wins when it names an existing file. Otherwise a copy
// shipped beside the executable (or in its bin/ folder) is used, then PATH.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::EXIFTOOL_PATH_ENV;

#[cfg(windows)]
const EXIFTOOL_FILENAME: &str = "exiftool.exe";
#[cfg(not(windows))]
const EXIFTOOL_FILENAME: &str = "exiftool";

/// Resolved exiftool path; a bare name means PATH lookup at spawn time.
pub fn exiftool_path() -> PathBuf {
    let install_dir = env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));
    locate(env::var_os(EXIFTOOL_PATH_ENV), install_dir.as_deref())
}

fn locate(override_value: Option<OsString>, install_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = existing_override(override_value) {
        return path;
    }

    install_dir
        .into_iter()
        .flat_map(|dir| [dir.join(EXIFTOOL_FILENAME), dir.join("bin").join(EXIFTOOL_FILENAME)])
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from("exiftool"))
}

fn existing_override(value: Option<OsString>) -> Option<PathBuf> {
    let path = PathBuf::from(value.filter(|v| !v.is_empty())?);
    if path.is_file() {
        Some(path)
    } else {
        log::warn!(
            "{} points at missing file {}, ignoring it",
            EXIFTOOL_PATH_ENV,
            path.display()
        );
        None
    }
}

/// True when the resolved exiftool answers `-ver`.
pub fn is_exiftool_available() -> bool {
    std::process::Command::new(exiftool_path())
        .arg("-ver")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
