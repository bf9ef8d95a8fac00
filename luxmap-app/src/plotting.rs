//! Static PNG renderings of surveys and spectra.

use anyhow::{Context, Result};
use luxmap_schemas::{
    label::spectral_legend_name,
    measurement::{ScatteredSample, ZField},
    spectral::{SpectralGroup, SINGLE_GROUP},
    surface::InterpolatedGrid,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

pub const SPECTRAL_MIN_NM: f64 = 380.0;
pub const SPECTRAL_MAX_NM: f64 = 780.0;
const PANEL_COLUMNS: usize = 3;
const PANEL_SIZE: (u32, u32) = (700, 400);

/// Wavelength → RGB control points (nm, r, g, b), interpolated linearly.
const WAVELENGTH_COLORS: [(f64, (f64, f64, f64)); 9] = [
    (380.0, (0.56, 0.0, 1.0)),
    (440.0, (0.0, 0.3, 1.0)),
    (485.0, (0.0, 0.8, 0.8)),
    (500.0, (0.0, 0.7, 0.2)),
    (565.0, (1.0, 0.85, 0.0)),
    (590.0, (1.0, 0.5, 0.0)),
    (625.0, (1.0, 0.0, 0.0)),
    (700.0, (0.7, 0.0, 0.0)),
    (780.0, (0.5, 0.0, 0.0)),
];

/// Viridis sampled at five stops.
const VIRIDIS: [(f64, (f64, f64, f64)); 5] = [
    (0.0, (0.267, 0.005, 0.329)),
    (0.25, (0.229, 0.322, 0.546)),
    (0.5, (0.128, 0.567, 0.551)),
    (0.75, (0.369, 0.789, 0.383)),
    (1.0, (0.993, 0.906, 0.144)),
];

const LINE_COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

fn interpolate_stops(stops: &[(f64, (f64, f64, f64))], t: f64) -> Option<(f64, f64, f64)> {
    stops.windows(2).find_map(|pair| {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t0 <= t && t <= t1 {
            let f = (t - t0) / (t1 - t0);
            Some((
                c0.0 + (c1.0 - c0.0) * f,
                c0.1 + (c1.1 - c0.1) * f,
                c0.2 + (c1.2 - c0.2) * f,
            ))
        } else {
            None
        }
    })
}

/// Display colour of light at `nm`, with fixed greys outside the visible range.
pub fn wavelength_rgb(nm: f64) -> (f64, f64, f64) {
    if nm < SPECTRAL_MIN_NM {
        return (0.6, 0.6, 0.7);
    }
    if nm > SPECTRAL_MAX_NM {
        return (0.5, 0.5, 0.5);
    }
    interpolate_stops(&WAVELENGTH_COLORS, nm).unwrap_or((0.5, 0.5, 0.5))
}

fn to_color((r, g, b): (f64, f64, f64)) -> RGBColor {
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(byte(r), byte(g), byte(b))
}

fn viridis(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
    to_color(interpolate_stops(&VIRIDIS, t).unwrap_or(VIRIDIS[2].1))
}

/// `(min, max)` of finite values, widened when flat so plotters gets a non-empty range.
fn padded_range(values: impl Iterator<Item = f64>, pad_fraction: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi > lo {
        let pad = (hi - lo) * pad_fraction;
        (lo - pad, hi + pad)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    Ok(())
}

/// 3D scatter of the samples, points coloured by z.
pub fn plot_scatter_3d(path: &Path, samples: &[ScatteredSample], z_field: ZField, size: (u32, u32)) -> Result<()> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded_range(samples.iter().map(|s| s.x), 0.05);
    let (y_lo, y_hi) = padded_range(samples.iter().map(|s| s.y), 0.05);
    let (z_lo, z_hi) = padded_range(samples.iter().map(|s| s.z), 0.05);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("3D distribution of {}", z_field.axis_label()), ("sans-serif", 40).into_font())
        .margin(10)
        .build_cartesian_3d(x_lo..x_hi, z_lo..z_hi, y_lo..y_hi)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart.configure_axes().max_light_lines(3).draw()?;

    chart.draw_series(samples.iter().map(|s| {
        Circle::new((s.x, s.z, s.y), 5, viridis(s.z, z_lo, z_hi).mix(0.8).filled())
    }))?;

    root.present()?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

/// Interpolated surface drawn as one quad per mesh cell with all four corners defined.
pub fn plot_surface_3d(path: &Path, grid: &InterpolatedGrid, z_field: ZField, size: (u32, u32)) -> Result<()> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded_range(grid.xs.iter().copied(), 0.0);
    let (y_lo, y_hi) = padded_range(grid.ys.iter().copied(), 0.0);
    let (z_lo, z_hi) = grid.z_range().unwrap_or((0.0, 1.0));
    let (z_axis_lo, z_axis_hi) = padded_range([z_lo, z_hi].into_iter(), 0.05);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Interpolated surface of {} ({})", z_field.axis_label(), grid.method),
            ("sans-serif", 40).into_font(),
        )
        .margin(10)
        .build_cartesian_3d(x_lo..x_hi, z_axis_lo..z_axis_hi, y_lo..y_hi)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart.configure_axes().max_light_lines(3).draw()?;

    let mut cells = Vec::new();
    for j in 0..grid.ys.len().saturating_sub(1) {
        for i in 0..grid.xs.len().saturating_sub(1) {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            let zs: Vec<f64> = corners.iter().map(|&(ci, cj)| grid.z[cj][ci]).collect();
            if zs.iter().any(|z| z.is_nan()) {
                continue;
            }
            let mean = zs.iter().sum::<f64>() / 4.0;
            let points: Vec<(f64, f64, f64)> = corners
                .iter()
                .zip(&zs)
                .map(|(&(ci, cj), &z)| (grid.xs[ci], z, grid.ys[cj]))
                .collect();
            cells.push(Polygon::new(points, viridis(mean, z_lo, z_hi).mix(0.9).filled()));
        }
    }
    if cells.is_empty() {
        log::warn!("Surface has no defined cells; only axes are drawn");
    }
    chart.draw_series(cells)?;

    root.present()?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

fn group_title(group: &SpectralGroup) -> String {
    if group.name == SINGLE_GROUP {
        "Group: files in the selected folder".to_string()
    } else {
        format!("Group: {}", spectral_legend_name(&group.name))
    }
}

/// Line chart of every curve with red crosses on detected peaks.
fn draw_spectral_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    groups: &[SpectralGroup],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let curves: Vec<_> = groups.iter().flat_map(|g| g.curves.iter()).collect();
    let (x_lo, x_hi) = padded_range(curves.iter().flat_map(|c| c.wavelengths.iter().copied()), 0.0);
    let (y_lo, y_hi) = padded_range(curves.iter().flat_map(|c| c.intensities.iter().copied()), 0.05);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Wavelength (nm)")
        .y_desc("PFD (umol m-2 s-1)")
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = LINE_COLORS[i % LINE_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                curve.wavelengths.iter().copied().zip(curve.intensities.iter().copied()),
                color.stroke_width(2),
            ))?
            .label(format!("{} ({})", spectral_legend_name(&curve.group), curve.source))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));

        chart.draw_series(
            curve
                .peak_points()
                .into_iter()
                .map(|p| Cross::new(p, 6, RED.stroke_width(2))),
        )?;
    }

    if !curves.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

pub fn plot_spectral_lines(path: &Path, groups: &[SpectralGroup], size: (u32, u32)) -> Result<()> {
    ensure_parent(path)?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let title = match groups {
        [single] => group_title(single),
        _ => "Spectra".to_string(),
    };
    draw_spectral_lines(&root, groups, &title)?;
    root.present()?;
    Ok(())
}

/// PNG bytes of the spectral line chart, rendered through a temporary file.
pub fn spectral_png_bytes(groups: &[SpectralGroup], size: (u32, u32)) -> Result<Vec<u8>> {
    let file = tempfile::Builder::new()
        .prefix("luxmap-spectrum-")
        .suffix(".png")
        .tempfile()
        .context("Failed to create a temporary image file")?;
    plot_spectral_lines(file.path(), groups, size)?;
    let bytes = fs::read(file.path()).with_context(|| format!("Failed to read {:?}", file.path()))?;
    Ok(bytes)
}

/// Rows and columns of the panel grid for `n` groups.
pub fn panel_layout(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = n.min(PANEL_COLUMNS);
    (n.div_ceil(cols), cols)
}

fn x_ticks() -> Vec<f64> {
    (0..=8).map(|k| SPECTRAL_MIN_NM + 50.0 * k as f64).collect()
}

/// One panel per group over 380–780 nm with every segment coloured by its
/// starting wavelength. A single group is drawn as one chart.
fn draw_spectral_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    group: &SpectralGroup,
    show_y_desc: bool,
    show_x_desc: bool,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (y_lo, y_hi) = padded_range(
        group
            .curves
            .iter()
            .filter(|c| c.wavelengths.len() >= 2)
            .flat_map(|c| c.intensities.iter().copied()),
        0.05,
    );

    let mut chart = ChartBuilder::on(area)
        .caption(group_title(group), ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (SPECTRAL_MIN_NM..SPECTRAL_MAX_NM).with_key_points(x_ticks()),
            y_lo..y_hi,
        )?;

    let mut mesh = chart.configure_mesh();
    mesh.light_line_style(BLACK.mix(0.05));
    if show_y_desc {
        mesh.y_desc("PFD (umol m-2 s-1)");
    }
    if show_x_desc {
        mesh.x_desc("Wavelength (nm)");
    }
    mesh.draw()?;

    for curve in group.curves.iter().filter(|c| c.wavelengths.len() >= 2) {
        let points: Vec<(f64, f64)> = curve
            .wavelengths
            .iter()
            .copied()
            .zip(curve.intensities.iter().copied())
            .filter(|(w, _)| (SPECTRAL_MIN_NM..=SPECTRAL_MAX_NM).contains(w))
            .collect();
        chart.draw_series(points.windows(2).map(|seg| {
            PathElement::new(vec![seg[0], seg[1]], to_color(wavelength_rgb(seg[0].0)).stroke_width(2))
        }))?;
    }
    Ok(())
}

pub fn plot_spectral_panels(path: &Path, groups: &[SpectralGroup]) -> Result<()> {
    ensure_parent(path)?;
    let (rows, cols) = panel_layout(groups.len());
    if rows == 0 {
        return Ok(());
    }
    let size = if groups.len() == 1 {
        (800, 500)
    } else {
        (PANEL_SIZE.0 * cols as u32, PANEL_SIZE.1 * rows as u32)
    };
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((rows, cols));
    for (idx, group) in groups.iter().enumerate() {
        draw_spectral_panel(&panels[idx], group, idx % cols == 0, idx / cols == rows - 1)?;
    }

    root.present()?;
    log::info!("Wrote {:?}", path);
    Ok(())
}
