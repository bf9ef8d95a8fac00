use serde::{Deserialize, Serialize};

/// Header of the wavelength column in a spectral export.
pub const WAVELENGTH_COLUMN: &str = "Wavelength(nm)";

/// Group name given to files found directly in a root without subdirectories.
pub const SINGLE_GROUP: &str = "selected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralCurve {
    pub group: String,
    pub source: String,
    pub wavelengths: Vec<f64>,
    pub intensities: Vec<f64>,
    pub peaks: Vec<usize>,
}

impl SpectralCurve {
    pub fn max_intensity(&self) -> Option<f64> {
        self.intensities
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// `(wavelength, intensity)` of each detected peak.
    pub fn peak_points(&self) -> Vec<(f64, f64)> {
        self.peaks
            .iter()
            .filter_map(|&i| Some((*self.wavelengths.get(i)?, *self.intensities.get(i)?)))
            .collect()
    }
}

/// Curves of one group, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralGroup {
    pub name: String,
    pub curves: Vec<SpectralCurve>,
}
