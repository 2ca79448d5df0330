// Write capture metadata for a matched pair into a timestamp-named output file

use std::path::{Path, PathBuf};
use crate::constants::{
    COPY_ONLY_EXTENSIONS, EXIF_DATETIME_FORMAT, JPEG_EXTENSION, OUTPUT_TIMESTAMP_FORMAT,
};
use crate::error::Result;
use crate::metadata::exiftool::{build_tags, TagRequest, TagWriter, ToolOutput};
use super::copy::copy_with_verify;
use super::diagnostic;
use super::matching::MatchedPair;
use super::naming::{unique_output_path, unique_preserving_name};

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Tagged { output: PathBuf },
    Copied { output: PathBuf },
    /// Tagged after retrying the source as a `.jpg`.
    Recovered { output: PathBuf },
    Failed { reason: String },
}

/// Tag (or copy) one matched pair into `output_dir`.
///
/// Tool and copy failures come back as `ApplyOutcome::Failed`. Errors are reserved for
/// a missing or unusable capture time and for exhausted output names, both of which end the run.
pub fn apply_pair(pair: &MatchedPair, output_dir: &Path, tagger: &dyn TagWriter) -> Result<ApplyOutcome> {
    let source = &pair.media.path;
    let record = &pair.record;

    if !source.exists() {
        diagnostic(format!("Image does not exist: {}", source.display()));
    }

    if record.photo_taken_time.is_none() {
        diagnostic(format!("No photoTakenTime: {}", pair.record_path.display()));
    }
    let captured = record.local_capture_time(&pair.record_path)?;

    if record.geo_data.is_none() {
        diagnostic(format!("No geoData: {}", pair.record_path.display()));
    }
    if record.description.is_none() {
        diagnostic(format!("No description: {}", pair.record_path.display()));
    }

    let tags = build_tags(record, &captured.format(EXIF_DATETIME_FORMAT).to_string());
    let base = captured.format(OUTPUT_TIMESTAMP_FORMAT).to_string();
    let output = unique_output_path(output_dir, &base, &pair.media.extension)?;

    log::info!("Original image: {}", source.display());

    let outcome = if COPY_ONLY_EXTENSIONS.contains(&pair.media.extension.as_str()) {
        copy_untaggable(source, &output)
    } else {
        let request = TagRequest {
            source: source.clone(),
            tags,
            output,
        };
        tag_with_recovery(pair, &request, &base, output_dir, tagger)?
    };

    match &outcome {
        ApplyOutcome::Tagged { output }
        | ApplyOutcome::Copied { output }
        | ApplyOutcome::Recovered { output } => log::info!("New image: {}", output.display()),
        ApplyOutcome::Failed { reason } => {
            log::error!("No output for {}: {}", source.display(), reason)
        }
    }

    Ok(outcome)
}

fn copy_untaggable(source: &Path, output: &Path) -> ApplyOutcome {
    log::info!("Copying `{}` -> `{}`", source.display(), output.display());
    match copy_with_verify(source, output) {
        Ok(bytes) => {
            log::info!("Copied {} bytes", bytes);
            ApplyOutcome::Copied { output: output.to_path_buf() }
        }
        Err(e) => ApplyOutcome::Failed { reason: e.to_string() },
    }
}

fn tag_with_recovery(
    pair: &MatchedPair,
    request: &TagRequest,
    base: &str,
    output_dir: &Path,
    tagger: &dyn TagWriter,
) -> Result<ApplyOutcome> {
    let result = match invoke(tagger, request) {
        Ok(r) => r,
        Err(e) => return Ok(ApplyOutcome::Failed { reason: e.to_string() }),
    };

    if result.reports_jpeg_mismatch() && pair.media.extension != JPEG_EXTENSION {
        return recover_as_jpeg(request, base, output_dir, tagger);
    }

    if result.success {
        Ok(ApplyOutcome::Tagged { output: request.output.clone() })
    } else {
        Ok(ApplyOutcome::Failed { reason: failure_reason(&result) })
    }
}

/// The tool found JPEG content behind another extension: retry once from a `.jpg` sibling.
fn recover_as_jpeg(
    request: &TagRequest,
    base: &str,
    output_dir: &Path,
    tagger: &dyn TagWriter,
) -> Result<ApplyOutcome> {
    let source = &request.source;
    let parent = source.parent().unwrap_or(Path::new("."));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let sibling = unique_preserving_name(parent, &format!("{}.{}", stem, JPEG_EXTENSION))?;

    log::info!("Copying `{}` -> `{}`", source.display(), sibling.display());
    if let Err(e) = copy_with_verify(source, &sibling) {
        return Ok(ApplyOutcome::Failed { reason: format!("JPEG recovery copy failed: {}", e) });
    }

    let jpeg_output = unique_output_path(output_dir, base, JPEG_EXTENSION)?;
    let retry = request.retarget(&sibling, &jpeg_output);
    let result = invoke(tagger, &retry);

    if let Err(e) = std::fs::remove_file(&sibling) {
        log::warn!("Could not remove temporary {}: {}", sibling.display(), e);
    }

    Ok(match result {
        Ok(r) if r.success => ApplyOutcome::Recovered { output: jpeg_output },
        Ok(r) => ApplyOutcome::Failed { reason: failure_reason(&r) },
        Err(e) => ApplyOutcome::Failed { reason: e.to_string() },
    })
}

/// Run the tagger and log the invocation with everything it printed.
fn invoke(tagger: &dyn TagWriter, request: &TagRequest) -> Result<ToolOutput> {
    log::info!("Running exiftool {:?}", request.to_args());
    let result = tagger.write_tags(request).map_err(|e| {
        log::error!("{}", e);
        e
    })?;

    if !result.stdout.is_empty() {
        log::info!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        log::error!("{}", result.stderr);
    }

    Ok(result)
}

fn failure_reason(result: &ToolOutput) -> String {
    if result.stderr.is_empty() {
        format!("exiftool exited with code {}", result.exit_code)
    } else {
        result.stderr.clone()
    }
}
