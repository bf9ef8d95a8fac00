//! Sorts measurement files into one subdirectory per label.

use crate::{classifier::classifier, error::LuxmapError};
use luxmap_schemas::label::MeasurementLabel;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrganizeReport {
    pub moved: Vec<(String, MeasurementLabel)>,
    pub untouched: Vec<String>,
}

impl OrganizeReport {
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

/// Creates the eight label subdirectories under `dir` and moves every
/// classified regular file into its label's subdirectory.
///
/// The first I/O error aborts the run; files already moved stay moved.
pub fn organize_directory(dir: &Path) -> Result<OrganizeReport, LuxmapError> {
    if !dir.is_dir() {
        return Err(LuxmapError::NotADirectory(dir.display().to_string()));
    }
    let classifier = classifier()?;

    for label in classifier.labels() {
        let sub = dir.join(label.token());
        fs::create_dir_all(&sub).map_err(|e| LuxmapError::io(&sub, e))?;
    }

    let mut report = OrganizeReport::default();
    for path in regular_files(dir)? {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let Some(name) = file_name.to_str().map(str::to_string) else {
            log::warn!("Leaving '{}' in place: name is not valid UTF-8", path.display());
            report.untouched.push(file_name.to_string_lossy().into_owned());
            continue;
        };
        match classifier.classify(&name) {
            Some(label) => {
                let destination = dir.join(label.token()).join(&name);
                fs::rename(&path, &destination).map_err(|e| LuxmapError::io(&path, e))?;
                log::info!("Moved '{}' -> {}/", name, label);
                report.moved.push((name, label));
            }
            None => report.untouched.push(name),
        }
    }

    log::info!(
        "Organization of '{}' complete: {} moved, {} left in place",
        dir.display(),
        report.moved.len(),
        report.untouched.len()
    );
    Ok(report)
}

/// Regular files directly inside `dir`, sorted by name.
pub(crate) fn regular_files(dir: &Path) -> Result<Vec<PathBuf>, LuxmapError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| LuxmapError::io(dir, e))? {
        let entry = entry.map_err(|e| LuxmapError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Immediate subdirectories of `dir`, sorted by name.
pub fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, LuxmapError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| LuxmapError::io(dir, e))? {
        let entry = entry.map_err(|e| LuxmapError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn moves_classified_files_and_leaves_the_rest() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a100A.txt");
        touch(dir.path(), "b0B.csv");
        touch(dir.path(), "c_unrelated.dat");

        let report = organize_directory(dir.path()).unwrap();

        assert!(dir.path().join("100A").join("a100A.txt").is_file());
        assert!(dir.path().join("0B").join("b0B.csv").is_file());
        assert!(dir.path().join("c_unrelated.dat").is_file());
        assert!(!dir.path().join("a100A.txt").exists());
        for label in MeasurementLabel::ALL {
            assert!(dir.path().join(label.token()).is_dir(), "missing {}", label);
        }
        assert_eq!(report.moved.len(), 2);
        assert_eq!(report.untouched, vec!["c_unrelated.dat".to_string()]);
    }

    #[test]
    fn second_run_is_a_noop() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a100A.txt");
        touch(dir.path(), "c_unrelated.dat");

        organize_directory(dir.path()).unwrap();
        let second = organize_directory(dir.path()).unwrap();

        assert!(second.is_noop());
        assert_eq!(second.untouched, vec!["c_unrelated.dat".to_string()]);
        assert!(dir.path().join("100A").join("a100A.txt").is_file());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_count_as_left_in_place() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff100A.txt")), "x").unwrap();
        touch(dir.path(), "a100A.txt");

        let report = organize_directory(dir.path()).unwrap();
        assert_eq!(report.moved, vec![("a100A.txt".to_string(), MeasurementLabel::Blue100)]);
        assert_eq!(report.untouched, vec!["bad\u{FFFD}100A.txt".to_string()]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let err = organize_directory(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LuxmapError::NotADirectory(_)));
    }
}
