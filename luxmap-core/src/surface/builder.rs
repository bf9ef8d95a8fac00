use super::{
    interpolate::{dedup_samples, estimate_gradients, Interpolator},
    triangulation::Triangulation,
};
use luxmap_schemas::{
    measurement::ScatteredSample,
    surface::{InterpolationMethod, GRID_RESOLUTION},
};

/// A fluent builder for constructing an `Interpolator`.
///
/// Samples with a non-finite coordinate or value are dropped, as are repeated
/// `(x, y)` positions after the first.
#[derive(Default)]
pub struct SurfaceBuilder {
    samples: Vec<ScatteredSample>,
    method: InterpolationMethod,
}

impl SurfaceBuilder {
    /// Creates a new, empty `SurfaceBuilder` using cubic interpolation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scattered samples to interpolate.
    pub fn with_samples(mut self, samples: Vec<ScatteredSample>) -> Self {
        self.samples = samples;
        self
    }

    /// Sets the samples from parallel columns, skipping rows whose z is missing.
    pub fn with_columns(mut self, xs: &[f64], ys: &[f64], zs: &[Option<f64>]) -> Self {
        self.samples = xs
            .iter()
            .zip(ys)
            .zip(zs)
            .filter_map(|((&x, &y), z)| z.map(|z| ScatteredSample { x, y, z }))
            .collect();
        self
    }

    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    /// Consumes the builder and triangulates the samples.
    pub fn build(self) -> Interpolator {
        let finite = self
            .samples
            .into_iter()
            .filter(|s| s.x.is_finite() && s.y.is_finite() && s.z.is_finite())
            .collect();
        let samples = dedup_samples(finite);

        let values: Vec<f64> = samples.iter().map(|s| s.z).collect();
        let triangulation = Triangulation::new(samples.iter().map(|s| (s.x, s.y)).collect());
        let gradients = match self.method {
            InterpolationMethod::Cubic => estimate_gradients(&triangulation, &values),
            _ => Vec::new(),
        };

        if triangulation.is_degenerate() && self.method != InterpolationMethod::Nearest {
            log::warn!(
                "{} sample(s) do not span an area; '{}' interpolation is undefined everywhere",
                values.len(),
                self.method
            );
        }

        Interpolator {
            method: self.method,
            values,
            triangulation,
            gradients,
            resolution: GRID_RESOLUTION,
        }
    }
}
