//! Discovery and parsing of `uMOL_*.txt` spectral exports.

use crate::{analysis::detect_peaks, error::LuxmapError, organizer::subdirectories};
use luxmap_schemas::spectral::{SpectralCurve, SpectralGroup, SINGLE_GROUP, WAVELENGTH_COLUMN};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const FILE_PREFIX: &str = "uMOL_";
pub const FILE_SUFFIX: &str = ".txt";

pub fn is_spectral_file(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// Column name → index map for a whitespace-delimited header line.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn parse(line: &str) -> Self {
        let columns: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let mut positions = HashMap::new();
        for (i, name) in columns.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self { columns, positions }
    }

    pub fn require(&self, file: &str, name: &str) -> Result<usize, LuxmapError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| LuxmapError::MissingField {
                file: file.to_string(),
                field: name.to_string(),
            })
    }

    /// Last column whose name contains both `PFD` and `umol`.
    pub fn require_pfd(&self, file: &str) -> Result<usize, LuxmapError> {
        self.columns
            .iter()
            .rposition(|c| c.contains("PFD") && c.contains("umol"))
            .ok_or_else(|| LuxmapError::MissingField {
                file: file.to_string(),
                field: "PFD (umol)".to_string(),
            })
    }
}

/// Strips `#` comments and drops blank lines.
fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
}

fn cell(file: &str, field: &str, tokens: &[&str], index: usize) -> Result<f64, LuxmapError> {
    let raw = tokens.get(index).copied().unwrap_or("");
    raw.parse::<f64>().map_err(|_| LuxmapError::MalformedNumber {
        file: file.to_string(),
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Parses the wavelength and PFD columns of one spectral export.
pub fn parse_spectral_table(file: &str, content: &str) -> Result<(Vec<f64>, Vec<f64>), LuxmapError> {
    let mut lines = data_lines(content);
    let header = HeaderIndex::parse(lines.next().unwrap_or(""));
    let wave_col = header.require(file, WAVELENGTH_COLUMN)?;
    let pfd_col = header.require_pfd(file)?;

    let mut wavelengths = Vec::new();
    let mut intensities = Vec::new();
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        wavelengths.push(cell(file, WAVELENGTH_COLUMN, &tokens, wave_col)?);
        intensities.push(cell(file, "PFD", &tokens, pfd_col)?);
    }

    if wavelengths.is_empty() {
        return Err(LuxmapError::EmptySpectrum(file.to_string()));
    }
    Ok((wavelengths, intensities))
}

pub fn load_curve(path: &Path, group: &str) -> Result<SpectralCurve, LuxmapError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content = fs::read_to_string(path).map_err(|e| LuxmapError::io(path, e))?;
    let (wavelengths, intensities) = parse_spectral_table(&name, &content)?;
    let peaks = detect_peaks(&intensities);
    log::debug!("{}: {} samples, {} peak(s)", name, wavelengths.len(), peaks.len());
    Ok(SpectralCurve {
        group: group.to_string(),
        source: name,
        wavelengths,
        intensities,
        peaks,
    })
}

/// `(group, file)` pairs under `root`. With subdirectories, each immediate
/// subdirectory is a group; otherwise the root itself is the single group.
pub fn discover(root: &Path) -> Result<Vec<(String, PathBuf)>, LuxmapError> {
    if !root.is_dir() {
        return Err(LuxmapError::NotADirectory(root.display().to_string()));
    }

    let has_groups = !subdirectories(root)?.is_empty();
    let depth = if has_groups { 2 } else { 1 };

    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            LuxmapError::io(&path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_spectral_file(name) {
            continue;
        }
        let group = if has_groups {
            entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| SINGLE_GROUP.to_string())
        } else {
            SINGLE_GROUP.to_string()
        };
        found.push((group, entry.into_path()));
    }
    Ok(found)
}

/// Curves grouped by directory plus the files that were skipped and why.
#[derive(Debug, Default)]
pub struct SpectralLoad {
    pub groups: Vec<SpectralGroup>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl SpectralLoad {
    pub fn curve_count(&self) -> usize {
        self.groups.iter().map(|g| g.curves.len()).sum()
    }

    pub fn curves(&self) -> impl Iterator<Item = &SpectralCurve> {
        self.groups.iter().flat_map(|g| g.curves.iter())
    }
}

/// Loads every spectral file under `root`. Files that cannot be parsed are
/// skipped with a warning; directory access errors abort.
pub fn load_groups(root: &Path) -> Result<SpectralLoad, LuxmapError> {
    let mut load = SpectralLoad::default();
    for (group, path) in discover(root)? {
        match load_curve(&path, &group) {
            Ok(curve) => push_curve(&mut load.groups, curve),
            Err(err) => {
                log::warn!("Skipping '{}': {}", path.display(), err);
                load.skipped.push((path, err.to_string()));
            }
        }
    }
    Ok(load)
}

/// Loads a single spectral file or every spectral file under a directory.
pub fn load_path(path: &Path) -> Result<SpectralLoad, LuxmapError> {
    if path.is_dir() {
        return load_groups(path);
    }
    let group = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| SINGLE_GROUP.to_string());
    let curve = load_curve(path, &group)?;
    Ok(SpectralLoad {
        groups: vec![SpectralGroup {
            name: group,
            curves: vec![curve],
        }],
        skipped: Vec::new(),
    })
}

fn push_curve(groups: &mut Vec<SpectralGroup>, curve: SpectralCurve) {
    match groups.iter_mut().find(|g| g.name == curve.group) {
        Some(group) => group.curves.push(curve),
        None => groups.push(SpectralGroup {
            name: curve.group.clone(),
            curves: vec![curve],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# LI-180 export\n\
        Wavelength(nm)\tPFD(umol)\tPFD-R(umol)\n\
        380\t0.1\t0.3\n\
        381\t0.5\t0.9 # inline note\n\
        \n\
        382\t0.2\t0.4\n";

    #[test]
    fn parses_columns_and_picks_last_pfd_column() {
        let (w, y) = parse_spectral_table("uMOL_1.txt", SAMPLE).unwrap();
        assert_eq!(w, vec![380.0, 381.0, 382.0]);
        assert_eq!(y, vec![0.3, 0.9, 0.4]);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let err = parse_spectral_table("uMOL_1.txt", "Wave\tPFD(umol)\n1\t2\n").unwrap_err();
        assert!(matches!(err, LuxmapError::MissingField { ref field, .. } if field == "Wavelength(nm)"));

        let err = parse_spectral_table("uMOL_1.txt", "Wavelength(nm)\tPFD\n1\t2\n").unwrap_err();
        assert!(matches!(err, LuxmapError::MissingField { .. }));
    }

    #[test]
    fn malformed_and_empty_tables_are_errors() {
        let err = parse_spectral_table("f", "Wavelength(nm) PFD_umol\n380 abc\n").unwrap_err();
        assert!(matches!(err, LuxmapError::MalformedNumber { .. }));
        let err = parse_spectral_table("f", "Wavelength(nm) PFD_umol\n").unwrap_err();
        assert!(matches!(err, LuxmapError::EmptySpectrum(_)));
    }

    #[test]
    fn header_index_keeps_first_duplicate() {
        let header = HeaderIndex::parse("a b a");
        assert_eq!(header.require("f", "a").unwrap(), 0);
        assert!(header.require("f", "c").is_err());
    }

    #[test]
    fn spectral_file_names() {
        assert!(is_spectral_file("uMOL_0001.txt"));
        assert!(!is_spectral_file("umol_0001.txt"));
        assert!(!is_spectral_file("uMOL_0001.csv"));
    }
}
