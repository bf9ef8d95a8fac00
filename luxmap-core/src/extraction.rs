//! Builds a `MeasurementTable` from a directory of `ESPD_<row><col>...` files.

use crate::{
    calibration, classifier::classifier, error::LuxmapError, export, organizer::regular_files,
};
use luxmap_schemas::{
    calibration::CalibrationTable,
    measurement::{MeasurementRecord, MeasurementTable, PhysicalPosition},
};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const PFD_FIELD: &str = "PFD";
const PPFD_FIELD: &str = "PPFD";

fn name_pattern() -> Result<&'static Regex, LuxmapError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(p) = PATTERN.get() {
        return Ok(p);
    }
    let built = Regex::new(r"^ESPD_([0-9])([0-9])")?;
    Ok(PATTERN.get_or_init(|| built))
}

/// Grid `(row, col)` encoded in a measurement filename.
pub fn grid_position(file_name: &str) -> Result<Option<(u8, u8)>, LuxmapError> {
    let Some(caps) = name_pattern()?.captures(file_name) else {
        return Ok(None);
    };
    let digit = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u8>().ok());
    Ok(digit(1).zip(digit(2)))
}

/// Scalar fields found in one file body.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FieldValues {
    pub pfd: Option<f64>,
    pub ppfd: Option<f64>,
}

/// Scans `content` for `PFD` / `PPFD` lines. The first line carrying a value
/// wins for each field; later lines for the same field are not looked at.
pub fn scan_fields(file: &str, content: &str) -> Result<FieldValues, LuxmapError> {
    let mut values = FieldValues::default();
    for line in content.lines() {
        if values.pfd.is_none() && starts_field(line, PFD_FIELD) {
            values.pfd = field_value(file, PFD_FIELD, line)?;
        }
        if values.ppfd.is_none() && starts_field(line, PPFD_FIELD) {
            values.ppfd = field_value(file, PPFD_FIELD, line)?;
        }
        if values.pfd.is_some() && values.ppfd.is_some() {
            break;
        }
    }
    Ok(values)
}

fn starts_field(line: &str, field: &str) -> bool {
    line.strip_prefix(field)
        .map_or(false, |rest| rest.starts_with('\t') || rest.starts_with(' '))
}

fn field_value(file: &str, field: &str, line: &str) -> Result<Option<f64>, LuxmapError> {
    let Some(raw) = line.split_whitespace().nth(1) else {
        return Ok(None);
    };
    raw.replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| LuxmapError::MalformedNumber {
            file: file.to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Extracts one record per `ESPD_<row><col>` file in `dir`, applies the
/// sibling calibration table when present and optionally writes the CSV.
///
/// Any unreadable or malformed file aborts the whole directory.
pub fn extract_directory(dir: &Path, persist: bool) -> Result<MeasurementTable, LuxmapError> {
    if !dir.is_dir() {
        return Err(LuxmapError::NotADirectory(dir.display().to_string()));
    }
    let classifier = classifier()?;

    let mut table = MeasurementTable::default();
    for path in regular_files(dir)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((grid_row, grid_col)) = grid_position(file_name)? else {
            continue;
        };
        let label = classifier.classify(file_name);
        if label.is_some() {
            table.last_label = label;
        }

        let content = fs::read_to_string(&path).map_err(|e| LuxmapError::io(&path, e))?;
        let values = scan_fields(file_name, &content)?;
        log::debug!(
            "{}: grid ({}, {}) PFD={:?} PPFD={:?}",
            file_name,
            grid_row,
            grid_col,
            values.pfd,
            values.ppfd
        );

        table.records.push(MeasurementRecord {
            file_name: file_name.to_string(),
            label,
            grid_row,
            grid_col,
            pfd: values.pfd,
            ppfd: values.ppfd,
            physical: None,
        });
    }

    if let Some(calibration) = calibration::load_for(dir)? {
        log::info!("Applying calibration from '{}'", calibration::calibration_path(dir).display());
        table = apply_calibration(table, &calibration);
    }

    log::info!("Extracted {} records from '{}'", table.len(), dir.display());

    if persist {
        let path = export::write_table(dir, &table)?;
        log::info!("Saved '{}'", path.display());
    }
    Ok(table)
}

/// Left join of the records against the calibration rows on grid indices.
/// Records without a calibration row keep a `None` physical position; a grid
/// position listed more than once in the calibration yields one record per row.
pub fn apply_calibration(table: MeasurementTable, calibration: &CalibrationTable) -> MeasurementTable {
    let mut records = Vec::with_capacity(table.records.len());
    for record in table.records {
        let matches: Vec<PhysicalPosition> = calibration
            .lookup(record.grid_row, record.grid_col)
            .map(|row| PhysicalPosition {
                x: row.linha,
                y: row.coluna,
            })
            .collect();

        if matches.is_empty() {
            records.push(MeasurementRecord {
                physical: None,
                ..record
            });
        } else {
            for position in matches {
                records.push(MeasurementRecord {
                    physical: Some(position),
                    ..record.clone()
                });
            }
        }
    }

    MeasurementTable {
        records,
        calibrated: true,
        last_label: table.last_label,
    }
}
