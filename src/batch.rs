//! Cleaning many files at once.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::clean::clean_file_report;
use crate::detect::has_pdf_extension;
use crate::model::CleanReport;
use crate::options::CleanOptions;
use crate::preprocess::INTERMEDIATE_SUFFIX;

/// Files found by [`discover`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// PDF files to clean, in discovery order, without duplicates
    pub files: Vec<PathBuf>,
    /// Inputs that do not exist
    pub missing: Vec<PathBuf>,
}

/// Expand inputs into the PDF files to clean.
///
/// Files are taken as given, even without a `.pdf` extension, so that the
/// clean reports the problem. Directories are walked recursively for `.pdf`
/// files, sorted by path, skipping earlier outputs and intermediate copies.
/// Links to directories found during the walk are not followed.
/// When `pattern` is set, only walked files whose name matches are kept.
pub fn discover<P: AsRef<Path>>(
    inputs: &[P],
    options: &CleanOptions,
    pattern: Option<&glob::Pattern>,
) -> Discovery {
    let mut discovery = Discovery::default();
    let mut seen = HashSet::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            let mut found = Vec::new();
            collect_pdfs(input, options, pattern, &mut found);
            found.sort();
            for path in found {
                if seen.insert(path.clone()) {
                    discovery.files.push(path);
                }
            }
        } else if input.exists() {
            if seen.insert(input.to_path_buf()) {
                discovery.files.push(input.to_path_buf());
            }
        } else {
            log::warn!("{} not found", input.display());
            discovery.missing.push(input.to_path_buf());
        }
    }

    discovery
}

fn collect_pdfs(
    dir: &Path,
    options: &CleanOptions,
    pattern: Option<&glob::Pattern>,
    files: &mut Vec<PathBuf>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            collect_pdfs(&path, options, pattern, files);
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            log::debug!("Not following directory link {}", path.display());
            continue;
        }
        if !path.is_file() || !has_pdf_extension(&path) || is_artifact(&path, options) {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if pattern.map_or(true, |pat| pat.matches(&name)) {
            files.push(path);
        }
    }
}

/// Whether `path` looks like a cleaned output or an intermediate copy.
pub fn is_artifact(path: &Path, options: &CleanOptions) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let output_suffix = format!("{}.pdf", options.output_suffix).to_ascii_lowercase();
    (!options.output_suffix.is_empty() && name.ends_with(&output_suffix))
        || name.ends_with(INTERMEDIATE_SUFFIX)
}

/// Clean files, returning one report per file in input order.
pub fn clean_paths(files: &[PathBuf], options: &CleanOptions) -> Vec<CleanReport> {
    clean_paths_with(files, options, |_| {})
}

/// Clean files, calling `on_done` as each one finishes.
///
/// Files are cleaned in parallel when [`CleanOptions::parallel`] is set;
/// `on_done` may then run concurrently and in any order. The returned
/// reports are always in input order.
pub fn clean_paths_with<F>(files: &[PathBuf], options: &CleanOptions, on_done: F) -> Vec<CleanReport>
where
    F: Fn(&CleanReport) + Sync,
{
    let clean = |path: &PathBuf| {
        let report = clean_file_report(path, options);
        on_done(&report);
        report
    };

    if options.parallel {
        files.par_iter().map(clean).collect()
    } else {
        files.iter().map(clean).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tema2");
        fs::create_dir(&nested).unwrap();
        for name in ["b.pdf", "a.PDF", "a_clean.pdf", "x.abc123_inter.pdf", "notes.txt"] {
            fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
        }
        fs::write(nested.join("c.pdf"), b"%PDF-1.4").unwrap();

        let options = CleanOptions::default();
        let found = discover(&[dir.path()], &options, None);
        let names: Vec<String> = found
            .files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf", "tema2/c.pdf"]);
        assert!(found.missing.is_empty());
    }

    #[test]
    fn test_discover_pattern_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tema1.pdf"), b"").unwrap();
        fs::write(dir.path().join("examen.pdf"), b"").unwrap();
        let missing = dir.path().join("nope.pdf");

        let pattern = glob::Pattern::new("tema*").unwrap();
        let inputs = vec![dir.path().to_path_buf(), missing.clone()];
        let found = discover(&inputs, &CleanOptions::default(), Some(&pattern));
        assert_eq!(found.files, vec![dir.path().join("tema1.pdf")]);
        assert_eq!(found.missing, vec![missing]);
    }

    #[test]
    fn test_discover_keeps_explicit_files_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"").unwrap();
        let found = discover(&[&file, &file], &CleanOptions::default(), None);
        assert_eq!(found.files, vec![file]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_directory_links() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), b"%PDF-1.4").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let found = discover(&[dir.path()], &CleanOptions::default(), None);
        assert_eq!(found.files, vec![dir.path().join("a.pdf")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_keeps_file_links() {
        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::write(target.path().join("real.pdf"), b"%PDF-1.4").unwrap();
        std::os::unix::fs::symlink(target.path().join("real.pdf"), dir.path().join("b.pdf"))
            .unwrap();

        let found = discover(&[dir.path()], &CleanOptions::default(), None);
        assert_eq!(found.files, vec![dir.path().join("b.pdf")]);
    }

    #[test]
    fn test_clean_paths_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("f{}.pdf", i));
                fs::write(&path, b"not a pdf").unwrap();
                path
            })
            .collect();

        let counter = std::sync::atomic::AtomicUsize::new(0);
        let reports = clean_paths_with(&files, &CleanOptions::default(), |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        assert_eq!(counter.into_inner(), 6);
        let inputs: Vec<PathBuf> = reports.iter().map(|r| r.input.clone()).collect();
        assert_eq!(inputs, files);
        assert!(reports.iter().all(|r| !r.result.is_success()));
    }
}
