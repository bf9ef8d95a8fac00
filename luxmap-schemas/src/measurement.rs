use crate::label::MeasurementLabel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calibrated position of a grid cell, as read from the calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPosition {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// One recognised measurement file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub file_name: String,
    pub label: Option<MeasurementLabel>,
    pub grid_row: u8,
    pub grid_col: u8,
    pub pfd: Option<f64>,
    pub ppfd: Option<f64>,
    /// Filled by the calibration join; `None` when no calibration row matched.
    pub physical: Option<PhysicalPosition>,
}

impl MeasurementRecord {
    pub fn value(&self, field: ZField) -> Option<f64> {
        match field {
            ZField::Pfd => self.pfd,
            ZField::Ppfd => self.ppfd,
        }
    }
}

/// The result of one extraction run over a directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementTable {
    pub records: Vec<MeasurementRecord>,
    pub calibrated: bool,
    /// Most recently seen label, used to name the persisted CSV.
    pub last_label: Option<MeasurementLabel>,
}

impl MeasurementTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Coordinates used for plotting: the physical position once calibrated, the grid indices otherwise.
    pub fn plot_coordinates(&self, record: &MeasurementRecord) -> (Option<f64>, Option<f64>) {
        if self.calibrated {
            match record.physical {
                Some(position) => (position.x, position.y),
                None => (None, None),
            }
        } else {
            (Some(record.grid_row as f64), Some(record.grid_col as f64))
        }
    }

    /// Samples for one z field, dropping rows where any coordinate or the value is missing.
    pub fn samples(&self, field: ZField) -> Vec<ScatteredSample> {
        self.records
            .iter()
            .filter_map(|record| {
                let (x, y) = self.plot_coordinates(record);
                Some(ScatteredSample {
                    x: x?,
                    y: y?,
                    z: record.value(field)?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatteredSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Which scalar field is plotted on the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZField {
    Pfd,
    #[default]
    Ppfd,
}

impl ZField {
    pub fn column(&self) -> &'static str {
        match self {
            ZField::Pfd => "PFD",
            ZField::Ppfd => "PPFD",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            ZField::Pfd => "PFD (umol m⁻² s⁻¹)",
            ZField::Ppfd => "PPFD (umol m⁻² s⁻¹)",
        }
    }
}

impl fmt::Display for ZField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for ZField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pfd" => Ok(ZField::Pfd),
            "ppfd" => Ok(ZField::Ppfd),
            other => Err(format!("unknown z field '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: u8, col: u8, ppfd: Option<f64>, physical: Option<PhysicalPosition>) -> MeasurementRecord {
        MeasurementRecord {
            file_name: format!("ESPD_{}{}_100A.txt", row, col),
            label: Some(MeasurementLabel::Blue100),
            grid_row: row,
            grid_col: col,
            pfd: None,
            ppfd,
            physical,
        }
    }

    #[test]
    fn uncalibrated_samples_use_grid_indices() {
        let table = MeasurementTable {
            records: vec![record(1, 2, Some(3.0), None), record(2, 2, None, None)],
            calibrated: false,
            last_label: None,
        };
        let samples = table.samples(ZField::Ppfd);
        assert_eq!(samples, vec![ScatteredSample { x: 1.0, y: 2.0, z: 3.0 }]);
        assert!(table.samples(ZField::Pfd).is_empty());
    }

    #[test]
    fn calibrated_samples_drop_unmatched_positions() {
        let matched = PhysicalPosition { x: Some(5.0), y: Some(7.5) };
        let table = MeasurementTable {
            records: vec![record(1, 2, Some(3.0), Some(matched)), record(4, 4, Some(9.0), None)],
            calibrated: true,
            last_label: None,
        };
        assert_eq!(
            table.samples(ZField::Ppfd),
            vec![ScatteredSample { x: 5.0, y: 7.5, z: 3.0 }]
        );
    }
}
