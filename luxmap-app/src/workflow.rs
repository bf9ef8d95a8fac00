use crate::config::AppConfig;
use crate::{html, plotting};
use anyhow::{Context, Result};
use luxmap_core::{
    extraction::extract_directory,
    organizer::{organize_directory, subdirectories, OrganizeReport},
    spectral::{load_groups, SpectralLoad},
    surface::interpolate,
};
use luxmap_schemas::{
    measurement::{MeasurementTable, ZField},
    surface::{InterpolatedGrid, InterpolationMethod},
};
use std::path::{Path, PathBuf};

/// How an operation ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Finished; lists the artifacts written, if any.
    Done(Vec<PathBuf>),
    /// There was nothing to work on.
    NothingToDo(String),
}

/// Presentation options for one command.
#[derive(Debug, Clone, Copy)]
pub struct PlotOptions {
    pub z_field: ZField,
    pub method: InterpolationMethod,
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

pub fn print_organize_report(dir: &Path, report: &OrganizeReport) {
    println!("\n--- [Organize] {} ---", dir.display());
    for (file, label) in &report.moved {
        println!("  {:<40} -> {}/", file, label);
    }
    println!(
        "  {} file(s) moved, {} left in place.",
        report.moved.len(),
        report.untouched.len()
    );
}

pub fn print_table(dir: &Path, table: &MeasurementTable) {
    println!("\n--- [Extraction] {} ---", dir.display());
    let coords = if table.calibrated { "linha / coluna" } else { "row / col" };
    println!(
        "  {:<32} {:<7} {:>18} {:>10} {:>10}",
        "file", "label", coords, "PFD", "PPFD"
    );
    for record in &table.records {
        let (x, y) = table.plot_coordinates(record);
        println!(
            "  {:<32} {:<7} {:>18} {:>10} {:>10}",
            record.file_name,
            record.label.map_or("-", |l| l.token()),
            format!("{} / {}", fmt_opt(x), fmt_opt(y)),
            fmt_opt(record.pfd),
            fmt_opt(record.ppfd),
        );
    }
    println!("  {} record(s){}", table.len(), if table.calibrated { ", calibrated" } else { "" });
}

/// Sorts the files of `dir` into label subdirectories.
pub fn organize(dir: &Path) -> Result<(OrganizeReport, Outcome)> {
    let report = organize_directory(dir)
        .with_context(|| format!("Failed to organize {:?}", dir))?;
    let outcome = if report.is_noop() {
        Outcome::NothingToDo(format!("No classifiable files in {:?}", dir))
    } else {
        Outcome::Done(Vec::new())
    };
    Ok((report, outcome))
}

/// Extracts and persists every immediate subdirectory of `root`, returning
/// the non-empty tables with their directories.
pub fn extract_all(root: &Path) -> Result<Vec<(PathBuf, MeasurementTable)>> {
    let dirs = subdirectories(root).with_context(|| format!("Failed to list {:?}", root))?;
    let mut tables = Vec::new();
    for dir in dirs {
        let table = extract_directory(&dir, true)
            .with_context(|| format!("Failed to extract {:?}", dir))?;
        if table.is_empty() {
            log::info!("No measurement files in {:?}", dir);
            continue;
        }
        tables.push((dir, table));
    }
    Ok(tables)
}

pub fn extraction_outcome(root: &Path, tables: &[(PathBuf, MeasurementTable)]) -> Outcome {
    if tables.is_empty() {
        return Outcome::NothingToDo(format!("No measurement files under {:?}", root));
    }
    Outcome::Done(
        tables
            .iter()
            .map(|(dir, table)| dir.join(luxmap_core::export::table_file_name(table)))
            .collect(),
    )
}

fn extract_for_plot(dir: &Path) -> Result<MeasurementTable> {
    let table = extract_directory(dir, false)
        .with_context(|| format!("Failed to extract {:?}", dir))?;
    print_table(dir, &table);
    Ok(table)
}

/// Interactive and static 3D scatter of one directory.
pub fn scatter(dir: &Path, options: PlotOptions, config: &AppConfig) -> Result<Outcome> {
    let table = extract_for_plot(dir)?;
    let samples = table.samples(options.z_field);
    if samples.is_empty() {
        return Ok(Outcome::NothingToDo(format!(
            "No {} values with coordinates in {:?}",
            options.z_field, dir
        )));
    }

    let stem = format!("scatter_{}_{}", dir_name(dir), options.z_field.column().to_lowercase());
    let html_path = config.output_path(&format!("{}.html", stem));
    let png_path = config.output_path(&format!("{}.png", stem));

    let figure = html::scatter_figure(&samples, options.z_field);
    let page = html::render_page(
        &format!("3D scatter: {}", dir_name(dir)),
        &format!("3D distribution of {}", options.z_field.axis_label()),
        &figure,
        false,
        &config.plotly_cdn,
    )?;
    html::write_page(&html_path, &page)?;
    let rendered = plotting::plot_scatter_3d(&png_path, &samples, options.z_field, config.png_size);

    Ok(with_static_copy(html_path, png_path, rendered))
}

/// Interpolated surface of one directory.
pub fn surface(dir: &Path, options: PlotOptions, config: &AppConfig) -> Result<Outcome> {
    let table = extract_for_plot(dir)?;
    let samples = table.samples(options.z_field);
    if samples.is_empty() {
        return Ok(Outcome::NothingToDo(format!(
            "No {} values with coordinates in {:?}",
            options.z_field, dir
        )));
    }

    let grid = interpolate(samples, options.method);
    report_grid(&dir_name(dir), &grid);

    let stem = format!(
        "surface_{}_{}_{}",
        dir_name(dir),
        options.z_field.column().to_lowercase(),
        options.method
    );
    let html_path = config.output_path(&format!("{}.html", stem));
    let png_path = config.output_path(&format!("{}.png", stem));

    let figure = html::surface_figure(&grid, options.z_field);
    let page = html::render_page(
        &format!("Surface: {}", dir_name(dir)),
        &html::surface_heading(options.method),
        &figure,
        false,
        &config.plotly_cdn,
    )?;
    html::write_page(&html_path, &page)?;
    let rendered = plotting::plot_surface_3d(&png_path, &grid, options.z_field, config.png_size);

    Ok(with_static_copy(html_path, png_path, rendered))
}

/// The HTML page is the primary artifact; a failed PNG only costs the static copy.
fn with_static_copy(html_path: PathBuf, png_path: PathBuf, rendered: Result<()>) -> Outcome {
    match rendered {
        Ok(()) => Outcome::Done(vec![html_path, png_path]),
        Err(err) => {
            log::warn!("Skipped static image {:?}: {:#}", png_path, err);
            Outcome::Done(vec![html_path])
        }
    }
}

fn report_grid(name: &str, grid: &InterpolatedGrid) {
    let total = grid.xs.len() * grid.ys.len();
    let defined = grid.defined_count();
    if defined == 0 {
        log::warn!("{}: {} interpolation is undefined everywhere", name, grid.method);
    } else {
        log::info!("{}: {}/{} mesh nodes defined", name, defined, total);
    }
}

/// One surface per non-empty subdirectory of `root`, overlaid in a single page.
pub fn multi_surface(root: &Path, options: PlotOptions, config: &AppConfig) -> Result<Outcome> {
    let dirs = subdirectories(root).with_context(|| format!("Failed to list {:?}", root))?;

    let mut surfaces = Vec::new();
    for dir in dirs {
        let table = extract_directory(&dir, false)
            .with_context(|| format!("Failed to extract {:?}", dir))?;
        let samples = table.samples(options.z_field);
        if samples.is_empty() {
            log::info!("Skipping {:?}: no {} values", dir, options.z_field);
            continue;
        }
        let grid = interpolate(samples, options.method);
        report_grid(&dir_name(&dir), &grid);
        surfaces.push((dir_name(&dir), grid));
    }

    if surfaces.is_empty() {
        return Ok(Outcome::NothingToDo(format!(
            "No subdirectory of {:?} has {} values",
            root, options.z_field
        )));
    }

    let figure = html::multi_surface_figure(&surfaces, options.z_field);
    let page = html::render_page(
        "Multiple 3D surfaces",
        &html::surface_heading(options.method),
        &figure,
        true,
        &config.plotly_cdn,
    )?;
    let path = config.output_path(html::MULTI_SURFACE_FILE);
    html::write_page(&path, &page)?;
    Ok(Outcome::Done(vec![path]))
}

fn load_spectra(root: &Path) -> Result<SpectralLoad> {
    let load = load_groups(root).with_context(|| format!("Failed to scan {:?}", root))?;
    println!("\n--- [Spectral] {} ---", root.display());
    for group in &load.groups {
        for curve in &group.curves {
            let peaks: Vec<String> = curve
                .peak_points()
                .iter()
                .map(|(w, _)| format!("{:.0}", w))
                .collect();
            println!(
                "  {:<10} {:<28} peaks (nm): {}",
                group.name,
                curve.source,
                if peaks.is_empty() { "-".to_string() } else { peaks.join(", ") }
            );
        }
    }
    for (path, reason) in &load.skipped {
        println!("  skipped {:?}: {}", path, reason);
    }
    Ok(load)
}

/// Interactive spectral chart written into `root`.
pub fn spectral(root: &Path, config: &AppConfig) -> Result<Outcome> {
    let load = load_spectra(root)?;
    if load.curve_count() == 0 {
        return Ok(Outcome::NothingToDo(format!("No readable uMOL_*.txt files under {:?}", root)));
    }

    let figure = html::spectral_figure(&load.groups);
    let page = html::render_page(
        "uMOL spectra by group",
        "Spectra from uMOL files",
        &figure,
        true,
        &config.plotly_cdn,
    )?;
    let path = root.join(html::SPECTRAL_FILE);
    html::write_page(&path, &page)?;
    Ok(Outcome::Done(vec![path]))
}

/// Static panel grid of the spectra, coloured by wavelength.
pub fn spectral_panels(root: &Path, config: &AppConfig) -> Result<Outcome> {
    let load = load_spectra(root)?;
    let groups: Vec<_> = load
        .groups
        .into_iter()
        .filter(|g| !g.curves.is_empty())
        .collect();
    if groups.is_empty() {
        return Ok(Outcome::NothingToDo(format!("No readable uMOL_*.txt files under {:?}", root)));
    }

    let path = config.output_path(&format!("spectra_{}.png", dir_name(root)));
    plotting::plot_spectral_panels(&path, &groups)?;
    Ok(Outcome::Done(vec![path]))
}
