//! Archive Expander: unpacks ZIP containers found in a working area until none remain.
//!
//! # Policy
//! Scan → expand is repeated to a fixed point, at most `max_depth` passes, so an archive
//! nested N levels deep needs N passes and an archive bomb that keeps producing archives
//! stops at the bound. Each archive is unpacked into a sibling `<stem>_unzipped`
//! directory and then deleted. Corrupt or oversized archives are skipped and left where
//! they are; the format classifier later reports them as unsupported.
//!
//! Word documents are ZIP files too; they are recognised by their main part and never
//! expanded.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::ErrorKind;
use crate::ingest::format::{sniff_path, zip_is_office_package, SniffedFormat};

#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    pub max_depth: usize,
    /// Upper bound on the declared uncompressed size of a single archive.
    pub max_uncompressed_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_uncompressed_bytes: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive declares {declared} uncompressed bytes (limit {limit})")]
    TooLarge { declared: u64, limit: u64 },
}

impl ArchiveError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ArchiveCorrupt
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpansionReport {
    pub expanded: usize,
    pub skipped: Vec<PathBuf>,
    pub passes: usize,
    /// Archives were still present when the pass bound ran out.
    pub depth_limit_hit: bool,
}

/// Expands every archive under `root`, bounded by `limits`. Never fails; problems with
/// individual archives end up in `ExpansionReport::skipped`.
pub fn expand_all(root: &Path, limits: ArchiveLimits) -> ExpansionReport {
    let mut report = ExpansionReport::default();
    let mut skipped: HashSet<PathBuf> = HashSet::new();

    for _ in 0..limits.max_depth {
        let archives = find_archives(root, &skipped);
        if archives.is_empty() {
            break;
        }
        report.passes += 1;

        for archive in archives {
            match expand_one(&archive, limits) {
                Ok(dest) => {
                    debug!("Expanded {} into {}", archive.display(), dest.display());
                    report.expanded += 1;
                }
                Err(e) => {
                    warn!(
                        kind = ?e.kind(),
                        "Skipping archive {}: {e}",
                        archive.display()
                    );
                    skipped.insert(archive.clone());
                    report.skipped.push(archive);
                }
            }
        }
    }

    if !find_archives(root, &skipped).is_empty() {
        warn!(
            "Archive nesting under {} exceeds {} levels; leaving the rest packed",
            root.display(),
            limits.max_depth
        );
        report.depth_limit_hit = true;
    }

    if report.expanded > 0 {
        info!(
            "Expanded {} archive(s) in {} pass(es)",
            report.expanded, report.passes
        );
    }
    report
}

/// True when the file's content is a ZIP container that is not a Word document.
pub fn is_archive(path: &Path) -> bool {
    matches!(sniff_path(path), Ok(SniffedFormat::Zip)) && !zip_is_office_package(path)
}

fn find_archives(root: &Path, skipped: &HashSet<PathBuf>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !skipped.contains(p) && is_archive(p))
        .collect()
}

fn expand_one(archive_path: &Path, limits: ArchiveLimits) -> Result<PathBuf, ArchiveError> {
    let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;

    let mut declared: u64 = 0;
    for i in 0..archive.len() {
        declared = declared.saturating_add(archive.by_index(i)?.size());
    }
    if declared > limits.max_uncompressed_bytes {
        return Err(ArchiveError::TooLarge {
            declared,
            limit: limits.max_uncompressed_bytes,
        });
    }

    let dest = sibling_dir(archive_path);
    std::fs::create_dir_all(&dest)?;
    if let Err(e) = archive.extract(&dest) {
        let _ = std::fs::remove_dir_all(&dest);
        return Err(e.into());
    }
    drop(archive);

    std::fs::remove_file(archive_path)?;
    Ok(dest)
}

fn sibling_dir(archive_path: &Path) -> PathBuf {
    let parent = archive_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = archive_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());

    let mut dest = parent.join(format!("{stem}_unzipped"));
    let mut n = 1;
    while dest.exists() {
        n += 1;
        dest = parent.join(format!("{stem}_unzipped_{n}"));
    }
    dest
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, bytes) in entries {
                writer
                    .start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn files_under(root: &Path) -> Vec<String> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_expands_single_archive_and_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("cv.pdf", &b"%PDF-1.4"[..]), ("notes/readme.txt", &b"hi"[..])]);
        std::fs::write(dir.path().join("bundle.zip"), bytes).unwrap();

        let report = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(report.expanded, 1);
        assert_eq!(report.passes, 1);
        assert_eq!(
            files_under(dir.path()),
            vec!["bundle_unzipped/cv.pdf", "bundle_unzipped/notes/readme.txt"]
        );
    }

    #[test]
    fn test_nested_archives_reach_fixed_point() {
        let dir = tempfile::tempdir().unwrap();
        let inner = zip_bytes(&[("cv.pdf", &b"%PDF-1.4"[..])]);
        let outer = zip_bytes(&[("inner.zip", &inner[..])]);
        std::fs::write(dir.path().join("outer.zip"), outer).unwrap();

        let report = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(report.expanded, 2);
        assert_eq!(report.passes, 2);
        assert!(!report.depth_limit_hit);
        assert_eq!(
            files_under(dir.path()),
            vec!["outer_unzipped/inner_unzipped/cv.pdf"]
        );
    }

    #[test]
    fn test_second_run_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("cv.pdf", &b"%PDF-1.4"[..])]);
        std::fs::write(dir.path().join("a.zip"), bytes).unwrap();

        expand_all(dir.path(), ArchiveLimits::default());
        let before = files_under(dir.path());
        let again = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(again, ExpansionReport::default());
        assert_eq!(files_under(dir.path()), before);
    }

    #[test]
    fn test_corrupt_archive_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.zip"), b"PK\x03\x04not really a zip").unwrap();
        let good = zip_bytes(&[("cv.pdf", &b"%PDF-1.4"[..])]);
        std::fs::write(dir.path().join("good.zip"), good).unwrap();

        let report = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(report.expanded, 1);
        assert_eq!(report.skipped, vec![dir.path().join("broken.zip")]);
        assert!(dir.path().join("broken.zip").exists());
        assert!(dir.path().join("good_unzipped/cv.pdf").exists());
    }

    #[test]
    fn test_depth_bound_stops_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let level3 = zip_bytes(&[("cv.pdf", &b"%PDF-1.4"[..])]);
        let level2 = zip_bytes(&[("l3.zip", &level3[..])]);
        let level1 = zip_bytes(&[("l2.zip", &level2[..])]);
        std::fs::write(dir.path().join("l1.zip"), level1).unwrap();

        let limits = ArchiveLimits {
            max_depth: 2,
            ..ArchiveLimits::default()
        };
        let report = expand_all(dir.path(), limits);

        assert_eq!(report.expanded, 2);
        assert!(report.depth_limit_hit);
        assert!(dir.path().join("l1_unzipped/l2_unzipped/l3.zip").exists());
    }

    #[test]
    fn test_oversized_archive_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("big.txt", &[b'a'; 4096][..])]);
        std::fs::write(dir.path().join("big.zip"), bytes).unwrap();

        let limits = ArchiveLimits {
            max_uncompressed_bytes: 1024,
            ..ArchiveLimits::default()
        };
        let report = expand_all(dir.path(), limits);

        assert_eq!(report.expanded, 0);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_word_documents_are_not_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let docx = zip_bytes(&[("word/document.xml", &b"<w:document/>"[..])]);
        std::fs::write(dir.path().join("cv.docx"), docx).unwrap();

        let report = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(report.expanded, 0);
        assert!(dir.path().join("cv.docx").exists());
    }

    #[test]
    fn test_other_office_packages_are_not_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx = zip_bytes(&[
            ("[Content_Types].xml", &b"<Types/>"[..]),
            ("xl/workbook.xml", &b"<workbook/>"[..]),
        ]);
        std::fs::write(dir.path().join("grades.xlsx"), xlsx).unwrap();

        let report = expand_all(dir.path(), ArchiveLimits::default());

        assert_eq!(report, ExpansionReport::default());
        assert!(dir.path().join("grades.xlsx").exists());
    }
}
