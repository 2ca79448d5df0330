// ExifTool wrapper for writing capture metadata

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use crate::constants::{
    GPS_ALTITUDE_REF, GPS_LATITUDE_REF, GPS_LONGITUDE_REF, JPEG_MISMATCH_SIGNATURE,
};
use crate::error::{ReconcileError, Result};
use super::SidecarRecord;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// The tool sniffed the content as JPEG despite a different extension.
    pub fn reports_jpeg_mismatch(&self) -> bool {
        self.stderr.contains(JPEG_MISMATCH_SIGNATURE)
    }
}

/// One tag-write: read `source`, write a tagged copy to `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRequest {
    pub source: PathBuf,
    pub tags: Vec<String>,
    pub output: PathBuf,
}

impl TagRequest {
    /// Argument vector in exiftool order: source, tags, `-o <output>`, `-m`.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.tags.len() + 4);
        args.push(self.source.clone().into_os_string());
        args.extend(self.tags.iter().map(OsString::from));
        args.push(OsString::from("-o"));
        args.push(self.output.clone().into_os_string());
        args.push(OsString::from("-m"));
        args
    }

    /// Same tags against a different source and output.
    pub fn retarget(&self, source: &Path, output: &Path) -> TagRequest {
        TagRequest {
            source: source.to_path_buf(),
            tags: self.tags.clone(),
            output: output.to_path_buf(),
        }
    }
}

/// Seam for the external tagging tool.
pub trait TagWriter {
    fn write_tags(&self, request: &TagRequest) -> Result<ToolOutput>;
}

/// Spawns exiftool with a structured argument vector (no shell).
#[derive(Debug, Clone)]
pub struct ExifTool {
    path: PathBuf,
}

impl ExifTool {
    pub fn new() -> Self {
        Self { path: crate::tools::exiftool_path() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TagWriter for ExifTool {
    fn write_tags(&self, request: &TagRequest) -> Result<ToolOutput> {
        let output = Command::new(&self.path)
            .args(request.to_args())
            .output()
            .map_err(|e| ReconcileError::ExifTool(format!("Failed to run exiftool: {}", e)))?;

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Build tag assignments for a sidecar. `captured` is already formatted as `YYYY:MM:DD HH:MM:SS`.
/// GPS values are written whenever present; zero is a real coordinate.
pub fn build_tags(record: &SidecarRecord, captured: &str) -> Vec<String> {
    let mut tags = vec![
        format!("-DateTimeOriginal={}", captured),
        format!("-CreateDate={}", captured),
    ];

    if let Some(geo) = &record.geo_data {
        if let Some(latitude) = geo.latitude {
            tags.push(format!("-GPSLatitude={}", latitude));
            tags.push(format!("-GPSLatitudeRef={}", GPS_LATITUDE_REF));
        }
        if let Some(longitude) = geo.longitude {
            tags.push(format!("-GPSLongitude={}", longitude));
            tags.push(format!("-GPSLongitudeRef={}", GPS_LONGITUDE_REF));
        }
        if let Some(altitude) = geo.altitude {
            tags.push(format!("-GPSAltitude={}", altitude));
            tags.push(format!("-GPSAltitudeRef={}", GPS_ALTITUDE_REF));
        }
    }

    if let Some(description) = record.normalized_description() {
        tags.push(format!("-Caption-Abstract={}", description));
        tags.push(format!("-Description={}", description));
        tags.push(format!("-ImageDescription={}", description));
    }

    tags
}

/// Check if exiftool is available
pub fn is_available() -> bool {
    crate::tools::is_exiftool_available()
}
