use std::path::Path;
use std::process::Command;

/// Set by packagers building from a source tarball without `.git`.
const BUILD_ID_OVERRIDE: &str = "STMTSORT_BUILD_ID";

fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!s.is_empty()).then_some(s)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    let build_id = std::env::var(BUILD_ID_OVERRIDE)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git(&workspace, &["describe", "--always", "--dirty", "--abbrev=10"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=SORTER_BUILD_ID={}", build_id);
    println!("cargo:rerun-if-env-changed={}", BUILD_ID_OVERRIDE);
    if let Some(git_dir) = git(&workspace, &["rev-parse", "--absolute-git-dir"]) {
        println!("cargo:rerun-if-changed={}/HEAD", git_dir);
        println!("cargo:rerun-if-changed={}/index", git_dir);
    }
}
