// Sidecar-to-media matching

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;
use crate::constants::DUPLICATE_SUFFIX_PATTERN;
use crate::metadata::{load_sidecar, SidecarRecord};
use super::discover::{MediaFile, ScanResult};
use super::normalize::{expected_image_filename, split_extension};

/// How a record found its media file. Direct beats Fallback when two records collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    /// Record had a duplicate suffix but only the untagged name existed.
    Fallback,
    /// Tagged candidate, or plain name for a record without a suffix.
    Direct,
}

#[derive(Debug, Clone)]
pub struct MatchedPair {
    pub media: MediaFile,
    pub record_path: PathBuf,
    pub record: SidecarRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnmatchedReason {
    Unreadable(String),
    MissingTitle,
    NoImage { expected: String },
    Displaced { media: PathBuf },
}

#[derive(Debug, Clone)]
pub struct UnmatchedRecord {
    pub path: PathBuf,
    pub reason: UnmatchedReason,
}

/// Several records resolved to one media file; only `winner` was paired.
#[derive(Debug, Clone)]
pub struct MatchConflict {
    pub media: PathBuf,
    pub winner: PathBuf,
    pub displaced: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub pairs: Vec<MatchedPair>,
    pub orphan_media: Vec<MediaFile>,
    pub orphan_records: Vec<UnmatchedRecord>,
    pub conflicts: Vec<MatchConflict>,
}

struct Claim {
    record_path: PathBuf,
    record: SidecarRecord,
    kind: MatchKind,
    displaced: Vec<PathBuf>,
}

/// Pair every sidecar with at most one media file and every media file with at most one sidecar.
pub fn match_records(scan: &ScanResult) -> MatchOutcome {
    let media_paths: HashSet<&Path> = scan.media.iter().map(|m| m.path.as_path()).collect();
    let mut claims: BTreeMap<PathBuf, Claim> = BTreeMap::new();
    let mut outcome = MatchOutcome::default();

    for record_path in &scan.records {
        let record = match load_sidecar(record_path) {
            Ok(r) => r,
            Err(e) => {
                outcome.orphan_records.push(UnmatchedRecord {
                    path: record_path.clone(),
                    reason: UnmatchedReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };

        let title = match record.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                outcome.orphan_records.push(UnmatchedRecord {
                    path: record_path.clone(),
                    reason: UnmatchedReason::MissingTitle,
                });
                continue;
            }
        };

        let expected = expected_image_filename(title);
        let resolved = resolve_media(record_path, &expected, |p| media_paths.contains(p));

        let (media_path, kind) = match resolved {
            Some(found) => found,
            None => {
                log::debug!("No image for {} (expected {})", record_path.display(), expected);
                outcome.orphan_records.push(UnmatchedRecord {
                    path: record_path.clone(),
                    reason: UnmatchedReason::NoImage { expected },
                });
                continue;
            }
        };

        log::debug!("Matched {} -> {} ({:?})", record_path.display(), media_path.display(), kind);

        match claims.entry(media_path) {
            Entry::Vacant(slot) => {
                slot.insert(Claim {
                    record_path: record_path.clone(),
                    record,
                    kind,
                    displaced: Vec::new(),
                });
            }
            Entry::Occupied(mut slot) => {
                let claim = slot.get_mut();
                if kind > claim.kind {
                    let previous = std::mem::replace(&mut claim.record_path, record_path.clone());
                    claim.record = record;
                    claim.kind = kind;
                    claim.displaced.push(previous);
                } else {
                    claim.displaced.push(record_path.clone());
                }
            }
        }
    }

    for (media_path, claim) in claims {
        if !claim.displaced.is_empty() {
            for displaced in &claim.displaced {
                outcome.orphan_records.push(UnmatchedRecord {
                    path: displaced.clone(),
                    reason: UnmatchedReason::Displaced { media: media_path.clone() },
                });
            }
            outcome.conflicts.push(MatchConflict {
                media: media_path.clone(),
                winner: claim.record_path.clone(),
                displaced: claim.displaced,
            });
        }

        outcome.pairs.push(MatchedPair {
            media: MediaFile::new(media_path),
            record_path: claim.record_path,
            record: claim.record,
        });
    }

    let matched: HashSet<&Path> = outcome.pairs.iter().map(|p| p.media.path.as_path()).collect();
    outcome.orphan_media = scan
        .media
        .iter()
        .filter(|m| !matched.contains(m.path.as_path()))
        .cloned()
        .collect();

    outcome.orphan_records.sort_by(|a, b| a.path.cmp(&b.path));

    outcome
}

/// Find the media file for a record given its expected image filename.
/// A duplicate suffix in the record's own name prefers the tagged candidate, then the plain one.
pub fn resolve_media(
    record_path: &Path,
    expected: &str,
    exists: impl Fn(&Path) -> bool,
) -> Option<(PathBuf, MatchKind)> {
    let dir = record_path.parent()?;
    let plain = dir.join(expected);

    match duplicate_suffix(record_path) {
        Some(suffix) => {
            let tagged = dir.join(tagged_candidate(expected, &suffix));
            if exists(&tagged) {
                Some((tagged, MatchKind::Direct))
            } else if exists(&plain) {
                Some((plain, MatchKind::Fallback))
            } else {
                None
            }
        }
        None => exists(&plain).then_some((plain, MatchKind::Direct)),
    }
}

/// First `(<digits>)` in the record's file stem, e.g. "(2)" for "IMG_0001.jpg(2).json".
pub fn duplicate_suffix(record_path: &Path) -> Option<String> {
    let stem = record_path.file_stem()?.to_str()?;
    duplicate_suffix_pattern().find(stem).map(|m| m.as_str().to_string())
}

fn duplicate_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DUPLICATE_SUFFIX_PATTERN).expect("duplicate suffix pattern is valid"))
}

/// Insert the suffix before the extension: ("Photo.jpg", "(2)") -> "Photo(2).jpg".
pub fn tagged_candidate(expected: &str, suffix: &str) -> String {
    let (base, ext) = split_extension(expected);
    format!("{}{}{}", base, suffix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write_sidecar(dir: &Path, name: &str, title: &str) -> PathBuf {
        let path = dir.join(name);
        let json = serde_json::json!({
            "title": title,
            "photoTakenTime": {"timestamp": "1700000000"},
        });
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"media").unwrap();
        path
    }

    fn scan_of(media: &[PathBuf], records: &[PathBuf]) -> ScanResult {
        ScanResult {
            media: media.iter().cloned().map(MediaFile::new).collect::<BTreeSet<_>>(),
            records: records.iter().cloned().collect(),
        }
    }

    #[test]
    fn test_duplicate_suffix() {
        assert_eq!(duplicate_suffix(Path::new("/a/Photo(2).json")).as_deref(), Some("(2)"));
        assert_eq!(duplicate_suffix(Path::new("/a/IMG_1.JPG(11).json")).as_deref(), Some("(11)"));
        assert_eq!(duplicate_suffix(Path::new("/a/Photo.jpg.json")), None);
        assert_eq!(duplicate_suffix(Path::new("/a/Photo().json")), None);
    }

    #[test]
    fn test_tagged_candidate() {
        assert_eq!(tagged_candidate("Photo.jpg", "(2)"), "Photo(2).jpg");
        assert_eq!(tagged_candidate("noext", "(1)"), "noext(1)");
    }

    #[test]
    fn test_resolve_prefers_tagged_then_plain() {
        let existing: HashSet<PathBuf> =
            [PathBuf::from("/a/Photo.jpg"), PathBuf::from("/a/Photo(2).jpg")].into_iter().collect();
        let exists = |p: &Path| existing.contains(p);

        assert_eq!(
            resolve_media(Path::new("/a/Photo(2).json"), "Photo.jpg", exists),
            Some((PathBuf::from("/a/Photo(2).jpg"), MatchKind::Direct))
        );
        assert_eq!(
            resolve_media(Path::new("/a/Photo(1).json"), "Photo.jpg", exists),
            Some((PathBuf::from("/a/Photo.jpg"), MatchKind::Fallback))
        );
        assert_eq!(
            resolve_media(Path::new("/a/Photo.jpg.json"), "Photo.jpg", exists),
            Some((PathBuf::from("/a/Photo.jpg"), MatchKind::Direct))
        );
        assert_eq!(resolve_media(Path::new("/a/Other.json"), "Other.jpg", exists), None);
    }

    #[test]
    fn test_duplicate_titles_resolve_to_distinct_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let photo = touch(dir, "Photo.jpg");
        let photo2 = touch(dir, "Photo(2).jpg");
        let json1 = write_sidecar(dir, "Photo(1).json", "Photo.jpg");
        let json2 = write_sidecar(dir, "Photo(2).json", "Photo.jpg");

        let outcome = match_records(&scan_of(&[photo.clone(), photo2.clone()], &[json1.clone(), json2.clone()]));

        assert_eq!(outcome.pairs.len(), 2);
        assert!(outcome.conflicts.is_empty());
        assert!(outcome.orphan_media.is_empty());
        assert!(outcome.orphan_records.is_empty());

        let by_record: BTreeMap<_, _> = outcome
            .pairs
            .iter()
            .map(|p| (p.record_path.clone(), p.media.path.clone()))
            .collect();
        assert_eq!(by_record[&json1], photo);
        assert_eq!(by_record[&json2], photo2);
    }

    #[test]
    fn test_collision_surfaces_conflict_and_keeps_direct_match() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let photo = touch(dir, "Photo.jpg");
        // Photo(1).json falls back to Photo.jpg; Photo.jpg.json matches it directly.
        let fallback = write_sidecar(dir, "Photo(1).json", "Photo.jpg");
        let direct = write_sidecar(dir, "Photo.jpg.json", "Photo.jpg");

        let outcome = match_records(&scan_of(&[photo.clone()], &[fallback.clone(), direct.clone()]));

        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].record_path, direct);
        assert_eq!(outcome.pairs[0].media.path, photo);

        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].winner, direct);
        assert_eq!(outcome.conflicts[0].displaced, vec![fallback.clone()]);

        assert_eq!(outcome.orphan_records.len(), 1);
        assert_eq!(outcome.orphan_records[0].path, fallback);
        assert_eq!(
            outcome.orphan_records[0].reason,
            UnmatchedReason::Displaced { media: photo }
        );
    }

    #[test]
    fn test_equal_kind_collision_keeps_first_record() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let photo = touch(dir, "Photo.jpg");
        let first = write_sidecar(dir, "A.json", "Photo.jpg");
        let second = write_sidecar(dir, "B.json", "Photo.jpg");

        let outcome = match_records(&scan_of(&[photo], &[first.clone(), second.clone()]));

        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].record_path, first);
        assert_eq!(outcome.conflicts[0].displaced, vec![second]);
    }

    #[test]
    fn test_orphans_on_both_sides() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let lonely = touch(dir, "lonely.png");
        let missing = write_sidecar(dir, "Gone.jpg.json", "Gone;1.jpg");
        let broken = dir.join("broken.json");
        std::fs::write(&broken, b"{not json").unwrap();
        let untitled = dir.join("untitled.json");
        std::fs::write(&untitled, br#"{"photoTakenTime": {"timestamp": "1"}}"#).unwrap();

        let outcome = match_records(&scan_of(
            &[lonely.clone()],
            &[missing.clone(), broken.clone(), untitled.clone()],
        ));

        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.orphan_media.len(), 1);
        assert_eq!(outcome.orphan_media[0].path, lonely);

        let reasons: BTreeMap<_, _> = outcome
            .orphan_records
            .iter()
            .map(|r| (r.path.clone(), r.reason.clone()))
            .collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(
            reasons[&missing],
            UnmatchedReason::NoImage { expected: "Gone_1.jpg".to_string() }
        );
        assert!(matches!(reasons[&broken], UnmatchedReason::Unreadable(_)));
        assert_eq!(reasons[&untitled], UnmatchedReason::MissingTitle);
    }

    #[test]
    fn test_wrong_typed_geo_data_still_pairs() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let photo = touch(dir, "a.jpg");
        let json = dir.join("a.jpg.json");
        std::fs::write(
            &json,
            br#"{"title": "a.jpg", "photoTakenTime": {"timestamp": "1700000000"},
                "geoData": {"latitude": "12.5", "longitude": "east", "altitude": null},
                "description": 42}"#,
        )
        .unwrap();

        let outcome = match_records(&scan_of(&[photo.clone()], &[json.clone()]));

        assert!(outcome.orphan_records.is_empty());
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].media.path, photo);
        let geo = outcome.pairs[0].record.geo_data.as_ref().unwrap();
        assert_eq!(geo.latitude, Some(12.5));
        assert!(geo.longitude.is_none());
        assert!(outcome.pairs[0].record.description.is_none());
    }

    #[test]
    fn test_truncated_title_matches_truncated_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let long_title = format!("{}.jpg", "v".repeat(70));
        let on_disk = touch(dir, &format!("{}.jpg", "v".repeat(47)));
        let json = write_sidecar(dir, &format!("{}.json", "v".repeat(46)), &long_title);

        let outcome = match_records(&scan_of(&[on_disk.clone()], &[json]));
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].media.path, on_disk);
    }
}
