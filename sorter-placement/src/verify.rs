//! Light structural checks run before a file is classified.
//!
//! This does not parse the PDF. It only rejects files that are obviously not
//! worth handing to a text backend.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Files larger than this are skipped.
pub const MAX_PDF_BYTES: u64 = 150 * 1024 * 1024;

/// The `%PDF-` signature may be preceded by junk; look this far in.
const SIGNATURE_WINDOW: usize = 20;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("{0} is empty")]
    Empty(PathBuf),
    #[error("{path} is too large ({size} bytes)")]
    TooLarge { path: PathBuf, size: u64 },
    #[error("{0} has no %PDF- signature")]
    BadSignature(PathBuf),
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn verify_pdf(path: &Path) -> Result<(), VerifyError> {
    let io_err = |source| VerifyError::Io {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        return Err(VerifyError::Missing(path.to_path_buf()));
    }
    let meta = fs::metadata(path).map_err(io_err)?;
    if !meta.is_file() {
        return Err(VerifyError::NotAFile(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(VerifyError::Empty(path.to_path_buf()));
    }
    if meta.len() > MAX_PDF_BYTES {
        return Err(VerifyError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
        });
    }

    let mut head = Vec::with_capacity(SIGNATURE_WINDOW);
    File::open(path)
        .map_err(io_err)?
        .take(SIGNATURE_WINDOW as u64)
        .read_to_end(&mut head)
        .map_err(io_err)?;
    if !head.windows(5).any(|w| w == b"%PDF-") {
        return Err(VerifyError::BadSignature(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_signature() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.pdf");
        fs::write(&p, b"%PDF-1.7\n...").unwrap();
        assert!(verify_pdf(&p).is_ok());
    }

    #[test]
    fn test_accepts_leading_junk() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.pdf");
        fs::write(&p, b"\r\n  %PDF-1.4 body").unwrap();
        assert!(verify_pdf(&p).is_ok());
    }

    #[test]
    fn test_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.pdf");
        fs::write(&p, b"<html>not a statement</html>").unwrap();
        assert!(matches!(verify_pdf(&p), Err(VerifyError::BadSignature(_))));
    }

    #[test]
    fn test_rejects_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty.pdf");
        fs::write(&p, b"").unwrap();
        assert!(matches!(verify_pdf(&p), Err(VerifyError::Empty(_))));
        assert!(matches!(
            verify_pdf(&dir.path().join("nope.pdf")),
            Err(VerifyError::Missing(_))
        ));
        assert!(matches!(verify_pdf(dir.path()), Err(VerifyError::NotAFile(_))));
    }
}
