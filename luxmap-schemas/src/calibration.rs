use serde::{Deserialize, Serialize};

/// A row of `coordenadas.csv`: grid indices `x`,`y` and the measured position `linha`,`coluna`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    pub x: f64,
    pub y: f64,
    pub linha: Option<f64>,
    pub coluna: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationTable {
    pub rows: Vec<CalibrationRow>,
}

impl CalibrationTable {
    /// All rows whose grid indices equal `(row, col)`, in file order.
    pub fn lookup(&self, row: u8, col: u8) -> impl Iterator<Item = &CalibrationRow> {
        let (row, col) = (row as f64, col as f64);
        self.rows.iter().filter(move |r| r.x == row && r.y == col)
    }
}
