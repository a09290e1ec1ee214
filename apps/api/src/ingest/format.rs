//! Format Classifier: decides what a file really is from its bytes, not its name.
//!
//! Content sniffing is authoritative. The file suffix only decides when the leading
//! bytes carry no known signature or cannot be read.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC_MIME: &str = "application/msword";
const ZIP_MIME: &str = "application/zip";

const PDF_MAGIC: &[u8] = b"%PDF-";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
/// Readers accept a PDF header anywhere in the first KiB.
const SNIFF_WINDOW: usize = 1024;

/// The closed set of document kinds the extractor knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    Unsupported,
}

/// What the leading bytes say, before any name-based guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Pdf,
    Docx,
    /// OLE2 compound file; legacy Word documents live in these.
    OleCompound,
    /// A ZIP container that is not a Word document.
    Zip,
    Unknown,
}

impl SniffedFormat {
    pub fn mime(self) -> Option<&'static str> {
        match self {
            SniffedFormat::Pdf => Some(PDF_MIME),
            SniffedFormat::Docx => Some(DOCX_MIME),
            SniffedFormat::OleCompound => Some(DOC_MIME),
            SniffedFormat::Zip => Some(ZIP_MIME),
            SniffedFormat::Unknown => None,
        }
    }
}

/// A leaf file eligible for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub detected_mime: Option<String>,
    /// Lower-cased suffix including the dot, or empty.
    pub suffix: String,
}

impl CandidateFile {
    /// Inspects `path`: reads its header for sniffing and records its suffix.
    pub fn inspect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let detected_mime = sniff_path(&path)
            .ok()
            .and_then(SniffedFormat::mime)
            .map(str::to_string);
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        Self {
            path,
            detected_mime,
            suffix,
        }
    }
}

/// Classifies a candidate. Never fails: anything unrecognised is `Unsupported`.
pub fn classify(candidate: &CandidateFile) -> DocumentKind {
    match candidate.detected_mime.as_deref() {
        Some(PDF_MIME) => DocumentKind::Pdf,
        Some(DOCX_MIME) => DocumentKind::Docx,
        Some(DOC_MIME) => DocumentKind::Doc,
        // Recognised content that is not a document (e.g. an archive left unexpanded).
        Some(_) => DocumentKind::Unsupported,
        None => kind_from_suffix(&candidate.path),
    }
}

/// Name-based fallback, via the registered MIME types for the extension.
fn kind_from_suffix(path: &Path) -> DocumentKind {
    let lowered = path.to_string_lossy().to_lowercase();
    let guesses = mime_guess::from_path(&lowered);
    for mime in guesses.iter_raw() {
        match mime {
            PDF_MIME => return DocumentKind::Pdf,
            DOCX_MIME => return DocumentKind::Docx,
            DOC_MIME => return DocumentKind::Doc,
            _ => {}
        }
    }
    DocumentKind::Unsupported
}

/// Reads the start of a file and matches it against known signatures.
pub fn sniff_path(path: &Path) -> std::io::Result<SniffedFormat> {
    let mut head = Vec::with_capacity(SNIFF_WINDOW);
    File::open(path)?
        .take(SNIFF_WINDOW as u64)
        .read_to_end(&mut head)?;

    Ok(match sniff_bytes(&head) {
        SniffedFormat::Zip if zip_is_word_document(path) => SniffedFormat::Docx,
        other => other,
    })
}

/// Signature match on a byte prefix. ZIP containers are reported as `Zip`; telling a
/// Word document apart needs the central directory (`sniff_path`).
pub fn sniff_bytes(head: &[u8]) -> SniffedFormat {
    if head.starts_with(OLE2_MAGIC) {
        SniffedFormat::OleCompound
    } else if head.starts_with(ZIP_MAGIC) || head.starts_with(ZIP_EMPTY_MAGIC) {
        SniffedFormat::Zip
    } else if head
        .windows(PDF_MAGIC.len())
        .take(SNIFF_WINDOW)
        .any(|w| w == PDF_MAGIC)
    {
        SniffedFormat::Pdf
    } else {
        SniffedFormat::Unknown
    }
}

/// True when the ZIP at `path` carries a WordprocessingML main part.
pub fn zip_is_word_document(path: &Path) -> bool {
    zip_contains(path, "word/document.xml")
}

/// True for any OOXML package (docx, xlsx, pptx), which must not be unpacked.
pub fn zip_is_office_package(path: &Path) -> bool {
    zip_contains(path, "[Content_Types].xml")
}

fn zip_contains(path: &Path, entry: &str) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let Ok(archive) = zip::ZipArchive::new(file) else {
        return false;
    };
    let found = archive.file_names().any(|name| name == entry);
    found
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
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

    #[test]
    fn test_sniff_bytes_signatures() {
        assert_eq!(sniff_bytes(b"%PDF-1.7\n"), SniffedFormat::Pdf);
        assert_eq!(sniff_bytes(b"\r\n  %PDF-1.4"), SniffedFormat::Pdf);
        assert_eq!(sniff_bytes(OLE2_MAGIC), SniffedFormat::OleCompound);
        assert_eq!(sniff_bytes(b"PK\x03\x04rest"), SniffedFormat::Zip);
        assert_eq!(sniff_bytes(b"hello"), SniffedFormat::Unknown);
        assert_eq!(sniff_bytes(b""), SniffedFormat::Unknown);
    }

    #[test]
    fn test_content_wins_over_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_named_docx = write(dir.path(), "resume.docx", b"%PDF-1.4 body");
        let candidate = CandidateFile::inspect(&pdf_named_docx);
        assert_eq!(candidate.suffix, ".docx");
        assert_eq!(classify(&candidate), DocumentKind::Pdf);

        let ole_named_pdf = write(dir.path(), "cv.PDF", OLE2_MAGIC);
        assert_eq!(classify(&CandidateFile::inspect(&ole_named_pdf)), DocumentKind::Doc);
    }

    #[test]
    fn test_docx_detected_from_zip_contents() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_with(&[
            ("[Content_Types].xml", &b"<Types/>"[..]),
            ("word/document.xml", &b"<w:document/>"[..]),
        ]);
        let no_suffix = write(dir.path(), "file", &bytes);

        let candidate = CandidateFile::inspect(&no_suffix);
        assert_eq!(candidate.detected_mime.as_deref(), Some(DOCX_MIME));
        assert_eq!(classify(&candidate), DocumentKind::Docx);
    }

    #[test]
    fn test_plain_zip_named_docx_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_with(&[("notes.txt", &b"hi"[..])]);
        let path = write(dir.path(), "resume.docx", &bytes);
        assert_eq!(classify(&CandidateFile::inspect(&path)), DocumentKind::Unsupported);
    }

    #[test]
    fn test_suffix_fallback_when_inconclusive() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("a.PDF", DocumentKind::Pdf),
            ("b.Docx", DocumentKind::Docx),
            ("c.doc", DocumentKind::Doc),
            ("d.txt", DocumentKind::Unsupported),
            ("noext", DocumentKind::Unsupported),
        ];
        for (name, expected) in cases {
            let path = write(dir.path(), name, b"no signature here");
            let candidate = CandidateFile::inspect(&path);
            assert_eq!(candidate.detected_mime, None);
            assert_eq!(classify(&candidate), expected, "{name}");
        }
    }

    #[test]
    fn test_unreadable_file_falls_back_to_suffix() {
        let candidate = CandidateFile::inspect("/definitely/missing/cv.pdf");
        assert_eq!(candidate.detected_mime, None);
        assert_eq!(classify(&candidate), DocumentKind::Pdf);
    }
}
