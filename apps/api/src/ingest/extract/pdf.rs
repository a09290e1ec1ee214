use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF extraction failed: {0}")]
    Parse(String),

    #[error("PDF extraction panicked - likely contains malformed fonts")]
    Panicked,
}

/// Splits a PDF into per-page text. Implementations must keep page order.
pub trait PdfReader: Send + Sync {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfError>;
}

/// Production reader backed by `pdf-extract`.
pub struct PdfExtractReader;

impl PdfReader for PdfExtractReader {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfError> {
        // pdf-extract (and its font parsers) can panic on malformed glyph tables.
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        })) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(PdfError::Parse(e.to_string())),
            Err(_) => Err(PdfError::Panicked),
        }
    }
}

/// Concatenates page texts in order. Pages with no text contribute nothing.
///
/// pdf-extract emits layout line breaks around each page's text; those are dropped so
/// a one-line page reads as that line.
pub fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|page| page.trim_matches(['\n', '\r']))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_keeps_order_and_tolerates_empty() {
        let pages = vec!["Hello World".to_string(), String::new(), "Page 3".to_string()];
        assert_eq!(join_pages(pages), "Hello WorldPage 3");
    }

    #[test]
    fn test_layout_newlines_around_pages_are_dropped() {
        let pages = vec!["\n\nHello World".to_string(), String::new(), "\nLine\n".to_string()];
        assert_eq!(join_pages(pages), "Hello WorldLine");
    }

    #[test]
    fn test_real_two_page_pdf() {
        let bytes = testing::pdf_bytes(&["Hello World", ""]);
        let pages = PdfExtractReader.pages(&bytes).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(join_pages(pages), "Hello World");
    }

    #[test]
    fn test_garbage_bytes_are_an_error_not_a_panic() {
        let result = PdfExtractReader.pages(b"%PDF-1.4\nthis is not a real pdf");
        assert!(result.is_err());
    }
}
