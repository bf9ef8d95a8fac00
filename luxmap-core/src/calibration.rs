use crate::error::LuxmapError;
use luxmap_schemas::calibration::{CalibrationRow, CalibrationTable};
use std::path::{Path, PathBuf};

pub const CALIBRATION_FILE: &str = "coordenadas.csv";

/// `<dir>/../coordenadas.csv`
pub fn calibration_path(data_dir: &Path) -> PathBuf {
    data_dir.join("..").join(CALIBRATION_FILE)
}

/// Loads the calibration table sitting one level above `data_dir`, if any.
pub fn load_for(data_dir: &Path) -> Result<Option<CalibrationTable>, LuxmapError> {
    let path = calibration_path(data_dir);
    if !path.is_file() {
        return Ok(None);
    }
    load(&path).map(Some)
}

pub fn load(path: &Path) -> Result<CalibrationTable, LuxmapError> {
    let name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| LuxmapError::CsvError(name.clone(), e))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: CalibrationRow = result.map_err(|e| LuxmapError::CsvError(name.clone(), e))?;
        rows.push(row);
    }
    log::debug!("Loaded {} calibration rows from '{}'", rows.len(), name);
    Ok(CalibrationTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_rows_and_ignores_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CALIBRATION_FILE);
        fs::write(&path, "x,y,linha,coluna,obs\n1,2,5.0,7.5,ok\n3, 4,,1.25,\n").unwrap();

        let table = load(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.lookup(1, 2).next().unwrap().linha, Some(5.0));
        let second = table.lookup(3, 4).next().unwrap();
        assert_eq!(second.linha, None);
        assert_eq!(second.coluna, Some(1.25));
        assert!(table.lookup(9, 9).next().is_none());
    }

    #[test]
    fn absent_file_means_no_calibration() {
        let root = tempdir().unwrap();
        let data = root.path().join("100A");
        fs::create_dir(&data).unwrap();
        assert!(load_for(&data).unwrap().is_none());

        fs::write(root.path().join(CALIBRATION_FILE), "x,y,linha,coluna\n0,0,1,1\n").unwrap();
        assert_eq!(load_for(&data).unwrap().unwrap().rows.len(), 1);
    }
}
