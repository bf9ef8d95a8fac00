//! Scattered-data interpolation onto a regular mesh.

pub mod builder;
pub mod interpolate;
pub mod triangulation;

use luxmap_schemas::{
    measurement::ScatteredSample,
    surface::{InterpolatedGrid, InterpolationMethod},
};

/// Interpolates `samples` onto a `GRID_RESOLUTION`² mesh over their bounding box.
pub fn interpolate(samples: Vec<ScatteredSample>, method: InterpolationMethod) -> InterpolatedGrid {
    builder::SurfaceBuilder::new()
        .with_samples(samples)
        .with_method(method)
        .build()
        .grid()
}

#[cfg(test)]
mod tests {
    use super::builder::SurfaceBuilder;
    use super::*;
    use luxmap_schemas::surface::GRID_RESOLUTION;

    fn unit_square() -> Vec<ScatteredSample> {
        [(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (0.0, 1.0, 1.0), (1.0, 1.0, 2.0)]
            .iter()
            .map(|&(x, y, z)| ScatteredSample { x, y, z })
            .collect()
    }

    #[test]
    fn nearest_at_origin_is_exact() {
        let grid = interpolate(unit_square(), InterpolationMethod::Nearest);
        assert_eq!(grid.xs.len(), GRID_RESOLUTION);
        assert_eq!(grid.ys.len(), GRID_RESOLUTION);
        assert_eq!(grid.z[0][0], 0.0);
        assert_eq!(grid.z[GRID_RESOLUTION - 1][GRID_RESOLUTION - 1], 2.0);
        assert_eq!(grid.defined_count(), GRID_RESOLUTION * GRID_RESOLUTION);
    }

    #[test]
    fn repeated_positions_keep_the_first_sample() {
        let samples: Vec<ScatteredSample> = [(0.0, 0.0, 5.0), (0.0, 0.0, 9.0), (2.0, 0.0, 1.0), (0.0, 2.0, 3.0)]
            .iter()
            .map(|&(x, y, z)| ScatteredSample { x, y, z })
            .collect();
        let surface = SurfaceBuilder::new()
            .with_samples(samples)
            .with_method(InterpolationMethod::Nearest)
            .build();

        assert_eq!(surface.sample_count(), 3);
        assert_eq!(surface.evaluate(0.0, 0.0), 5.0);
        // (1, 0) is equidistant from (0, 0) and (2, 0)
        assert_eq!(surface.evaluate(1.0, 0.0), 5.0);
        assert_eq!(surface.evaluate(1.0, 1.0), 5.0);
    }

    #[test]
    fn linear_reproduces_a_plane_inside_the_hull() {
        // z = x + y on the unit square is linear, so any triangulation reproduces it
        let grid = interpolate(unit_square(), InterpolationMethod::Linear);
        for (j, &y) in grid.ys.iter().enumerate() {
            for (i, &x) in grid.xs.iter().enumerate() {
                assert!((grid.z[j][i] - (x + y)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn linear_is_undefined_outside_the_hull() {
        let samples: Vec<ScatteredSample> = [(0.0, 0.0, 1.0), (2.0, 0.0, 1.0), (0.0, 2.0, 1.0)]
            .iter()
            .map(|&(x, y, z)| ScatteredSample { x, y, z })
            .collect();
        let interpolator = SurfaceBuilder::new()
            .with_samples(samples)
            .with_method(InterpolationMethod::Linear)
            .build();
        assert!((interpolator.evaluate(0.5, 0.5) - 1.0).abs() < 1e-12);
        assert!(interpolator.evaluate(1.9, 1.9).is_nan());

        let grid = interpolator.grid();
        assert!(grid.z[GRID_RESOLUTION - 1][GRID_RESOLUTION - 1].is_nan());
        assert!(grid.defined_count() > 0);
    }

    #[test]
    fn cubic_with_too_few_points_is_all_nan() {
        let three: Vec<ScatteredSample> = unit_square().into_iter().take(3).collect();
        let grid = interpolate(three, InterpolationMethod::Cubic);
        assert_eq!(grid.xs.len(), GRID_RESOLUTION);
        assert_eq!(grid.defined_count(), 0);
        assert!(grid.z_range().is_none());
    }

    #[test]
    fn cubic_matches_samples_at_nodes() {
        let mut samples = unit_square();
        samples.push(ScatteredSample { x: 0.5, y: 0.5, z: 3.0 });
        let interpolator = SurfaceBuilder::new().with_samples(samples.clone()).build();
        for s in samples {
            assert!((interpolator.evaluate(s.x, s.y) - s.z).abs() < 1e-9);
        }
        assert!(interpolator.evaluate(-0.1, 0.5).is_nan());
    }

    #[test]
    fn collinear_samples_degrade_gracefully() {
        let samples: Vec<ScatteredSample> = (0..5)
            .map(|i| ScatteredSample { x: i as f64, y: i as f64, z: 1.0 })
            .collect();
        let grid = interpolate(samples.clone(), InterpolationMethod::Linear);
        assert_eq!(grid.defined_count(), 0);
        let nearest = interpolate(samples, InterpolationMethod::Nearest);
        assert_eq!(nearest.defined_count(), GRID_RESOLUTION * GRID_RESOLUTION);
    }

    #[test]
    fn missing_z_values_are_dropped() {
        let interpolator = SurfaceBuilder::new()
            .with_columns(&[0.0, 1.0, 5.0], &[0.0, 1.0, 5.0], &[Some(1.0), Some(2.0), None])
            .with_method(InterpolationMethod::Nearest)
            .build();
        assert_eq!(interpolator.sample_count(), 2);
        assert_eq!(interpolator.grid().xs.last(), Some(&1.0));
    }

    #[test]
    fn no_samples_give_an_empty_grid() {
        let grid = interpolate(Vec::new(), InterpolationMethod::Cubic);
        assert!(grid.is_empty());
    }
}
