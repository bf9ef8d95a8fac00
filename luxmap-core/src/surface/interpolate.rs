use super::triangulation::{Triangle, Triangulation};
use luxmap_schemas::{
    measurement::ScatteredSample,
    surface::{InterpolatedGrid, InterpolationMethod},
};

/// Minimum sample count for the cubic patches.
pub const MIN_CUBIC_SAMPLES: usize = 4;

/// A scattered-data interpolant ready to be evaluated anywhere in the plane.
pub struct Interpolator {
    pub(super) method: InterpolationMethod,
    pub(super) values: Vec<f64>,
    pub(super) triangulation: Triangulation,
    pub(super) gradients: Vec<(f64, f64)>,
    pub(super) resolution: usize,
}

impl Interpolator {
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn sample_count(&self) -> usize {
        self.values.len()
    }

    /// Interpolated value at `(x, y)`; `NaN` where the method is undefined.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        match self.method {
            InterpolationMethod::Nearest => self.nearest(x, y),
            InterpolationMethod::Linear => match self.triangulation.locate(x, y) {
                Some((t, w)) => t.iter().zip(w).map(|(&v, wi)| self.values[v] * wi).sum(),
                None => f64::NAN,
            },
            InterpolationMethod::Cubic => {
                if self.values.len() < MIN_CUBIC_SAMPLES {
                    return f64::NAN;
                }
                match self.triangulation.locate(x, y) {
                    Some((t, w)) => self.cubic_patch(t, w),
                    None => f64::NAN,
                }
            }
        }
    }

    /// Evaluates on a `resolution × resolution` mesh spanning the sample bounding box.
    pub fn grid(&self) -> InterpolatedGrid {
        let points = &self.triangulation.points;
        if points.is_empty() {
            return InterpolatedGrid {
                method: self.method,
                ..InterpolatedGrid::default()
            };
        }
        let (min_x, max_x, min_y, max_y) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        );
        let xs = linspace(min_x, max_x, self.resolution);
        let ys = linspace(min_y, max_y, self.resolution);
        let z = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| self.evaluate(x, y)).collect())
            .collect();
        InterpolatedGrid {
            xs,
            ys,
            z,
            method: self.method,
        }
    }

    fn nearest(&self, x: f64, y: f64) -> f64 {
        let mut best = (f64::INFINITY, f64::NAN);
        for (&(px, py), &v) in self.triangulation.points.iter().zip(&self.values) {
            let d = (px - x).powi(2) + (py - y).powi(2);
            if d < best.0 {
                best = (d, v);
            }
        }
        best.1
    }

    /// Cubic Bézier triangle built from vertex values and gradients.
    fn cubic_patch(&self, t: Triangle, w: [f64; 3]) -> f64 {
        let p = |i: usize| self.triangulation.points[t[i]];
        let f = |i: usize| self.values[t[i]];
        let g = |i: usize| self.gradients[t[i]];
        // Ordinate one third of the way from vertex i towards vertex j.
        let edge = |i: usize, j: usize| {
            let (pi, pj, gi) = (p(i), p(j), g(i));
            f(i) + (gi.0 * (pj.0 - pi.0) + gi.1 * (pj.1 - pi.1)) / 3.0
        };

        let (b300, b030, b003) = (f(0), f(1), f(2));
        let (b210, b120) = (edge(0, 1), edge(1, 0));
        let (b201, b102) = (edge(0, 2), edge(2, 0));
        let (b021, b012) = (edge(1, 2), edge(2, 1));
        let e = (b210 + b120 + b201 + b102 + b021 + b012) / 6.0;
        let v = (b300 + b030 + b003) / 3.0;
        let b111 = e + (e - v) / 2.0;

        let [u, s, r] = w;
        b300 * u.powi(3)
            + b030 * s.powi(3)
            + b003 * r.powi(3)
            + 3.0 * (b210 * u * u * s + b120 * u * s * s)
            + 3.0 * (b201 * u * u * r + b102 * u * r * r)
            + 3.0 * (b021 * s * s * r + b012 * s * r * r)
            + 6.0 * b111 * u * s * r
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Least-squares gradient at each vertex from its triangulation neighbours,
/// weighted by inverse squared distance. Vertices without usable neighbours get a flat gradient.
pub(super) fn estimate_gradients(triangulation: &Triangulation, values: &[f64]) -> Vec<(f64, f64)> {
    (0..triangulation.points.len())
        .map(|v| {
            let (px, py) = triangulation.points[v];
            let (mut sxx, mut sxy, mut syy, mut sxz, mut syz) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for n in triangulation.neighbours(v) {
                let (dx, dy) = (triangulation.points[n].0 - px, triangulation.points[n].1 - py);
                let d2 = dx * dx + dy * dy;
                if d2 == 0.0 {
                    continue;
                }
                let w = 1.0 / d2;
                let dz = values[n] - values[v];
                sxx += w * dx * dx;
                sxy += w * dx * dy;
                syy += w * dy * dy;
                sxz += w * dx * dz;
                syz += w * dy * dz;
            }
            let det = sxx * syy - sxy * sxy;
            if det.abs() < 1e-12 {
                (0.0, 0.0)
            } else {
                ((syy * sxz - sxy * syz) / det, (sxx * syz - sxy * sxz) / det)
            }
        })
        .collect()
}

/// Drops samples at an already-seen `(x, y)`, keeping the first.
pub(super) fn dedup_samples(samples: Vec<ScatteredSample>) -> Vec<ScatteredSample> {
    let mut out: Vec<ScatteredSample> = Vec::with_capacity(samples.len());
    for s in samples {
        if !out.iter().any(|o| o.x == s.x && o.y == s.y) {
            out.push(s);
        }
    }
    out
}
