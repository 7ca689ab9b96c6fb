//! Page-text acquisition.
//!
//! The engine never opens files itself; everything it reads comes through a
//! [`TextSource`]. Failures are values: the classifier falls back to filename
//! heuristics when extraction fails.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Ordered page texts of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// No text at all (failed extraction or image-only document).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single page, mostly for tests and sidecar files without form feeds.
    pub fn from_text(text: &str) -> Self {
        Self::new(vec![text.to_string()])
    }

    /// True when every page is blank.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }

    /// Pages joined with newlines.
    pub fn full_text(&self) -> String {
        self.pages.join("\n")
    }

    /// All non-blank lines across pages, trimmed, in page order.
    pub fn lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum TextSourceError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("text extraction failed for {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
    #[error("no extractable text in {0}")]
    NoText(PathBuf),
    #[error("no text source can handle {0}")]
    Unsupported(PathBuf),
}

/// Anything that can turn a statement file into page text.
pub trait TextSource: Send + Sync {
    fn extract(&self, path: &Path) -> Result<PageText, TextSourceError>;
}

/// Native PDF text via `pdf-extract`, first `max_pages` pages only.
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    pub max_pages: usize,
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self { max_pages: 10 }
    }
}

impl PdfTextSource {
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }
}

impl TextSource for PdfTextSource {
    fn extract(&self, path: &Path) -> Result<PageText, TextSourceError> {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(TextSourceError::Unsupported(path.to_path_buf()));
        }

        // pdf-extract can panic on malformed files
        let owned = path.to_path_buf();
        let result = std::panic::catch_unwind(move || pdf_extract::extract_text_by_pages(&owned));
        let pages = match result {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(TextSourceError::ExtractionFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(TextSourceError::ExtractionFailed {
                    path: path.to_path_buf(),
                    reason: "PDF extraction panicked (malformed file)".to_string(),
                });
            }
        };

        let text = PageText::new(pages.into_iter().take(self.max_pages).collect());
        if text.is_empty() {
            return Err(TextSourceError::NoText(path.to_path_buf()));
        }
        tracing::debug!("Extracted {} page(s) from {}", text.pages.len(), path.display());
        Ok(text)
    }
}

/// Pre-extracted text stored next to the statement as `<file>.txt`
/// (e.g. `statement.pdf.txt`). Pages are separated by form feeds.
#[derive(Debug, Clone, Default)]
pub struct SidecarTextSource;

impl SidecarTextSource {
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_owned();
        os.push(".txt");
        PathBuf::from(os)
    }
}

impl TextSource for SidecarTextSource {
    fn extract(&self, path: &Path) -> Result<PageText, TextSourceError> {
        let sidecar = Self::sidecar_path(path);
        if !sidecar.exists() {
            return Err(TextSourceError::Unsupported(path.to_path_buf()));
        }
        let raw = fs::read_to_string(&sidecar).map_err(|source| TextSourceError::Io {
            path: sidecar.clone(),
            source,
        })?;
        let text = PageText::new(raw.split('\x0c').map(str::to_string).collect());
        if text.is_empty() {
            return Err(TextSourceError::NoText(path.to_path_buf()));
        }
        Ok(text)
    }
}

/// Tries each backend in order; the first non-empty result wins.
pub struct ChainedTextSource {
    sources: Vec<Box<dyn TextSource>>,
}

impl ChainedTextSource {
    pub fn new(sources: Vec<Box<dyn TextSource>>) -> Self {
        Self { sources }
    }

    /// Sidecar text first, then the PDF itself.
    pub fn standard(max_pages: usize) -> Self {
        Self::new(vec![
            Box::new(SidecarTextSource),
            Box::new(PdfTextSource::new(max_pages)),
        ])
    }
}

impl TextSource for ChainedTextSource {
    fn extract(&self, path: &Path) -> Result<PageText, TextSourceError> {
        let mut last_err = TextSourceError::Unsupported(path.to_path_buf());
        for source in &self.sources {
            match source.extract(path) {
                Ok(text) => return Ok(text),
                // keep the most informative failure
                Err(TextSourceError::Unsupported(_)) => {}
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}
