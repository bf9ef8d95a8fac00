use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mesh divisions per axis of an interpolated surface.
pub const GRID_RESOLUTION: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Cubic,
    Linear,
    Nearest,
}

impl InterpolationMethod {
    pub fn token(&self) -> &'static str {
        match self {
            InterpolationMethod::Cubic => "cubic",
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Nearest => "nearest",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for InterpolationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cubic" => Ok(InterpolationMethod::Cubic),
            "linear" => Ok(InterpolationMethod::Linear),
            "nearest" => Ok(InterpolationMethod::Nearest),
            other => Err(format!(
                "unknown interpolation method '{}' (expected cubic, linear or nearest)",
                other
            )),
        }
    }
}

/// A regular mesh with one z value per node; `z[j][i]` sits at `(xs[i], ys[j])`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterpolatedGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    pub method: InterpolationMethod,
}

impl InterpolatedGrid {
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() || self.ys.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.z.iter().flatten().filter(|v| !v.is_nan()).count()
    }

    /// Smallest and largest defined z, or `None` when every node is undefined.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
