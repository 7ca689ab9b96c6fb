//! Content-hash duplicate detection.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};

/// Hex SHA-1 of a file's bytes.
pub fn file_sha1(path: &Path) -> Result<String> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(f);
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Groups of identical files, each in input order. Groups are ordered by
/// their first member. Unreadable files are logged and left out.
pub fn find_duplicates(paths: &[PathBuf]) -> Vec<Vec<PathBuf>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<PathBuf>> = HashMap::new();

    for p in paths {
        let hash = match file_sha1(p) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!("Skipping duplicate check for {}: {:#}", p.display(), e);
                continue;
            }
        };
        let entry = groups.entry(hash.clone()).or_default();
        if entry.is_empty() {
            order.push(hash);
        }
        entry.push(p.clone());
    }

    order
        .into_iter()
        .filter_map(|h| groups.remove(&h))
        .filter(|g| g.len() > 1)
        .collect()
}

/// Paths to skip: every member of a duplicate group except the first.
pub fn redundant_copies(groups: &[Vec<PathBuf>]) -> Vec<PathBuf> {
    groups
        .iter()
        .flat_map(|g| g.iter().skip(1).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sha1_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("abc.pdf");
        fs::write(&p, b"abc").unwrap();
        assert_eq!(file_sha1(&p).unwrap(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_groups_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        let c = dir.path().join("c.pdf");
        let d = dir.path().join("d.pdf");
        fs::write(&a, b"%PDF-one").unwrap();
        fs::write(&b, b"%PDF-two").unwrap();
        fs::write(&c, b"%PDF-one").unwrap();
        fs::write(&d, b"%PDF-three").unwrap();

        let groups = find_duplicates(&[b.clone(), a.clone(), d, c.clone()]);
        assert_eq!(groups, vec![vec![a, c.clone()]]);
        assert_eq!(redundant_copies(&groups), vec![c]);
    }

    #[test]
    fn test_unreadable_files_are_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let groups = find_duplicates(&[dir.path().join("gone.pdf")]);
        assert!(groups.is_empty());
    }
}
