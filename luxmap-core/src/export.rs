use crate::error::LuxmapError;
use csv::Writer;
use luxmap_schemas::measurement::{MeasurementRecord, MeasurementTable};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Row layout without calibration: `linha`/`coluna` are the grid indices.
#[derive(Debug, Serialize)]
struct GridRow<'a> {
    arquivo: &'a str,
    #[serde(rename = "ID")]
    id: Option<&'static str>,
    linha: u8,
    coluna: u8,
    #[serde(rename = "PFD")]
    pfd: Option<f64>,
    #[serde(rename = "PPFD")]
    ppfd: Option<f64>,
}

/// Row layout after calibration: `X`/`Y` keep the grid indices and
/// `linha`/`coluna` carry the calibrated position.
#[derive(Debug, Serialize)]
struct CalibratedRow<'a> {
    arquivo: &'a str,
    #[serde(rename = "ID")]
    id: Option<&'static str>,
    #[serde(rename = "X")]
    grid_x: u8,
    #[serde(rename = "Y")]
    grid_y: u8,
    #[serde(rename = "PFD")]
    pfd: Option<f64>,
    #[serde(rename = "PPFD")]
    ppfd: Option<f64>,
    linha: Option<f64>,
    coluna: Option<f64>,
}

const GRID_HEADER: [&str; 6] = ["arquivo", "ID", "linha", "coluna", "PFD", "PPFD"];
const CALIBRATED_HEADER: [&str; 8] = ["arquivo", "ID", "X", "Y", "PFD", "PPFD", "linha", "coluna"];

/// `df_all_files_<label>.csv`, or `df_all_files.csv` when no label was seen.
pub fn table_file_name(table: &MeasurementTable) -> String {
    match table.last_label {
        Some(label) => format!("df_all_files_{}.csv", label),
        None => "df_all_files.csv".to_string(),
    }
}

/// Writes `table` into `dir`, replacing any previous file of the same name.
pub fn write_table(dir: &Path, table: &MeasurementTable) -> Result<PathBuf, LuxmapError> {
    let path = dir.join(table_file_name(table));
    if path.exists() {
        fs::remove_file(&path).map_err(|e| LuxmapError::io(&path, e))?;
    }
    let name = path.display().to_string();
    let file = fs::File::create(&path).map_err(|e| LuxmapError::io(&path, e))?;
    // Header is written by hand so an empty table still gets one.
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    write_rows(&mut writer, table).map_err(|e| LuxmapError::CsvError(name.clone(), e))?;
    writer.flush().map_err(|e| LuxmapError::io(&path, e))?;
    Ok(path)
}

fn write_rows<W: std::io::Write>(
    writer: &mut Writer<W>,
    table: &MeasurementTable,
) -> Result<(), csv::Error> {
    if table.calibrated {
        writer.write_record(CALIBRATED_HEADER)?;
        for record in &table.records {
            writer.serialize(calibrated_row(record))?;
        }
    } else {
        writer.write_record(GRID_HEADER)?;
        for record in &table.records {
            writer.serialize(GridRow {
                arquivo: &record.file_name,
                id: record.label.map(|l| l.token()),
                linha: record.grid_row,
                coluna: record.grid_col,
                pfd: record.pfd,
                ppfd: record.ppfd,
            })?;
        }
    }
    Ok(())
}

fn calibrated_row(record: &MeasurementRecord) -> CalibratedRow<'_> {
    CalibratedRow {
        arquivo: &record.file_name,
        id: record.label.map(|l| l.token()),
        grid_x: record.grid_row,
        grid_y: record.grid_col,
        pfd: record.pfd,
        ppfd: record.ppfd,
        linha: record.physical.and_then(|p| p.x),
        coluna: record.physical.and_then(|p| p.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxmap_schemas::label::MeasurementLabel;
    use luxmap_schemas::measurement::PhysicalPosition;
    use tempfile::tempdir;

    fn record() -> MeasurementRecord {
        MeasurementRecord {
            file_name: "ESPD_12_100A.dat".into(),
            label: Some(MeasurementLabel::Blue100),
            grid_row: 1,
            grid_col: 2,
            pfd: Some(10.5),
            ppfd: None,
            physical: Some(PhysicalPosition { x: Some(5.0), y: Some(7.5) }),
        }
    }

    #[test]
    fn grid_layout() {
        let dir = tempdir().unwrap();
        let table = MeasurementTable {
            records: vec![record()],
            calibrated: false,
            last_label: Some(MeasurementLabel::Blue100),
        };
        let path = write_table(dir.path(), &table).unwrap();
        assert!(path.ends_with("df_all_files_100A.csv"));
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "arquivo,ID,linha,coluna,PFD,PPFD\nESPD_12_100A.dat,100A,1,2,10.5,\n");
    }

    #[test]
    fn calibrated_layout_and_overwrite() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("df_all_files.csv"), "stale").unwrap();
        let table = MeasurementTable {
            records: vec![record()],
            calibrated: true,
            last_label: None,
        };
        let path = write_table(dir.path(), &table).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "arquivo,ID,X,Y,PFD,PPFD,linha,coluna\nESPD_12_100A.dat,100A,1,2,10.5,,5.0,7.5\n"
        );
    }

    #[test]
    fn empty_table_still_has_a_header() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), &MeasurementTable::default()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "arquivo,ID,linha,coluna,PFD,PPFD\n");
    }
}
