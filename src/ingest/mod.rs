// Reconcile pipeline: scan, match, copy orphans, tag pairs

pub mod discover;
pub mod normalize;
pub mod matching;
pub mod naming;
pub mod copy;
pub mod apply;
pub mod orphans;


use std::fmt::Display;
use std::path::Path;

use crate::error::Result;
use crate::metadata::exiftool::TagWriter;
use apply::ApplyOutcome;
use matching::{MatchOutcome, UnmatchedReason};

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub media_found: usize,
    pub records_found: usize,
    pub pairs: usize,
    pub tagged: usize,
    pub copied: usize,
    pub recovered: usize,
    pub failed: usize,
    pub orphan_media_copied: usize,
    pub orphan_media_failed: usize,
    pub orphan_records: usize,
    pub conflicts: usize,
}

/// Reconcile `input_dir` into `output_dir`.
pub fn run_reconcile(input_dir: &Path, output_dir: &Path, tagger: &dyn TagWriter) -> Result<RunReport> {
    let scan = discover::scan_input(input_dir)?;
    let outcome = matching::match_records(&scan);

    let mut report = RunReport {
        media_found: scan.media.len(),
        records_found: scan.records.len(),
        pairs: outcome.pairs.len(),
        orphan_records: outcome.orphan_records.len(),
        conflicts: outcome.conflicts.len(),
        ..Default::default()
    };

    report_unmatched(&outcome);

    std::fs::create_dir_all(output_dir)?;

    for copy in orphans::copy_orphans(&outcome.orphan_media, output_dir)? {
        if copy.copied {
            report.orphan_media_copied += 1;
        } else {
            report.orphan_media_failed += 1;
        }
    }

    for pair in &outcome.pairs {
        match apply::apply_pair(pair, output_dir, tagger)? {
            ApplyOutcome::Tagged { .. } => report.tagged += 1,
            ApplyOutcome::Copied { .. } => report.copied += 1,
            ApplyOutcome::Recovered { .. } => report.recovered += 1,
            ApplyOutcome::Failed { .. } => report.failed += 1,
        }
    }

    log::info!("Run complete: {:?}", report);
    Ok(report)
}

/// One diagnostic per conflict, unmatched media file and unmatched sidecar.
fn report_unmatched(outcome: &MatchOutcome) {
    for conflict in &outcome.conflicts {
        let displaced: Vec<String> = conflict
            .displaced
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        diagnostic(format!(
            "Conflicting json for image: {} (kept {}, dropped {})",
            conflict.media.display(),
            conflict.winner.display(),
            displaced.join(", ")
        ));
    }

    for media in &outcome.orphan_media {
        diagnostic(format!("No json for image: {}", media.path.display()));
    }

    for record in &outcome.orphan_records {
        let path = record.path.display();
        let message = match &record.reason {
            UnmatchedReason::NoImage { expected } => {
                format!("No image for json: {} (image in title: {})", path, expected)
            }
            UnmatchedReason::Unreadable(e) => format!("Unreadable json: {} ({})", path, e),
            UnmatchedReason::MissingTitle => format!("No title in json: {}", path),
            UnmatchedReason::Displaced { media } => format!(
                "No image for json: {} (image {} went to another json)",
                path,
                media.display()
            ),
        };
        diagnostic(message);
    }
}

/// Print a non-fatal condition for the operator and keep it in the run log.
pub(crate) fn diagnostic(message: impl Display) {
    println!("{}", message);
    log::warn!("{}", message);
}
