//! Self-contained HTML artifacts rendered client-side by Plotly.
//!
//! Figures are plain `serde_json` values (`data` traces plus a `layout`);
//! undefined surface nodes serialize as `null`, which Plotly leaves as holes.

use anyhow::{Context, Result};
use luxmap_schemas::{
    label::{spectral_legend_name, surface_gradient, surface_legend_name, Gradient},
    measurement::{ScatteredSample, ZField},
    spectral::SpectralGroup,
    surface::{InterpolatedGrid, InterpolationMethod},
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const MULTI_SURFACE_FILE: &str = "multiplas_surfaces_interativo.html";
pub const SPECTRAL_FILE: &str = "espectros_umol_interativo.html";

const FONT: &str = "Segoe UI, Segoe, Arial";
const PLOT_DIV: &str = "luxmap-plot";

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    /// Distinct `legendgroup` values of the traces, sorted.
    pub fn legend_groups(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|t| t.get("legendgroup").and_then(Value::as_str))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn colorscale(gradient: Gradient) -> Value {
    let rgb = |(r, g, b): (u8, u8, u8)| format!("rgb({},{},{})", r, g, b);
    json!([[0, rgb(gradient.low)], [1, rgb(gradient.high)]])
}

fn scene(z_field: ZField, eye: (f64, f64, f64)) -> Value {
    json!({
        "xaxis": { "title": { "text": "Row (X)" } },
        "yaxis": { "title": { "text": "Column (Y)" } },
        "zaxis": { "title": { "text": z_field.axis_label() } },
        "camera": { "eye": { "x": eye.0, "y": eye.1, "z": eye.2 } },
    })
}

fn base_layout(title: &str) -> Value {
    json!({
        "title": { "text": title },
        "font": { "family": FONT, "size": 14 },
        "template": "plotly_white",
        "hovermode": "closest",
    })
}

fn merge(mut target: Value, extra: Value) -> Value {
    if let (Some(t), Value::Object(e)) = (target.as_object_mut(), extra) {
        t.extend(e);
    }
    target
}

fn z_contours() -> Value {
    json!({
        "z": { "show": true, "usecolormap": true, "highlightcolor": "limegreen", "project": { "z": true } }
    })
}

pub fn scatter_figure(samples: &[ScatteredSample], z_field: ZField) -> Figure {
    let label = z_field.axis_label();
    let z: Vec<f64> = samples.iter().map(|s| s.z).collect();
    let trace = json!({
        "type": "scatter3d",
        "mode": "markers",
        "x": samples.iter().map(|s| s.x).collect::<Vec<_>>(),
        "y": samples.iter().map(|s| s.y).collect::<Vec<_>>(),
        "z": z,
        "marker": {
            "size": 6,
            "color": z,
            "colorscale": "Viridis",
            "colorbar": { "title": { "text": label } },
            "opacity": 0.8,
        },
    });
    Figure {
        data: vec![trace],
        layout: merge(
            base_layout(&format!("3D distribution of {}", label)),
            json!({ "scene": scene(z_field, (2.0, -2.0, 2.0)) }),
        ),
    }
}

fn surface_trace(grid: &InterpolatedGrid, z_field: ZField) -> Value {
    json!({
        "type": "surface",
        "x": grid.xs,
        "y": grid.ys,
        "z": grid.z,
        "contours": z_contours(),
        "hovertemplate": format!(
            "Row (X): %{{x}}<br>Column (Y): %{{y}}<br>{}: %{{z:.2f}}<extra></extra>",
            z_field.axis_label()
        ),
    })
}

pub fn surface_figure(grid: &InterpolatedGrid, z_field: ZField) -> Figure {
    let label = z_field.axis_label();
    let trace = merge(
        surface_trace(grid, z_field),
        json!({ "colorscale": "Viridis", "colorbar": { "title": { "text": label } } }),
    );
    Figure {
        data: vec![trace],
        layout: merge(
            base_layout(&format!("Interpolated surface of {} ({})", label, grid.method)),
            json!({ "scene": scene(z_field, (2.0, -2.0, 0.7)) }),
        ),
    }
}

/// One surface per `(group, grid)` pair with the group's gradient and legend name.
/// Only the first trace shows a colour bar.
pub fn multi_surface_figure(surfaces: &[(String, InterpolatedGrid)], z_field: ZField) -> Figure {
    let label = z_field.axis_label();
    let data = surfaces
        .iter()
        .enumerate()
        .map(|(idx, (group, grid))| {
            let legend = surface_legend_name(group);
            let mut trace = merge(
                surface_trace(grid, z_field),
                json!({
                    "name": legend,
                    "legendgroup": legend,
                    "colorscale": colorscale(surface_gradient(group)),
                    "opacity": 0.8,
                    "showscale": idx == 0,
                    "visible": true,
                    "hovertemplate": format!(
                        "{}<br>Row (X): %{{x}}<br>Column (Y): %{{y}}<br>{}: %{{z:.2f}}<extra></extra>",
                        legend, label
                    ),
                }),
            );
            if idx == 0 {
                trace = merge(
                    trace,
                    json!({ "colorbar": { "title": { "text": label }, "len": 0.5, "y": 0.75 } }),
                );
            }
            trace
        })
        .collect();

    Figure {
        data,
        layout: merge(
            base_layout(""),
            json!({
                "scene": scene(z_field, (2.0, -2.0, 0.7)),
                "legend": { "title": { "text": "Group" } },
                "uirevision": "keep-rotation",
            }),
        ),
    }
}

/// One line per curve plus red `x` markers on its peaks, sharing the
/// curve's legend group so both toggle together.
pub fn spectral_figure(groups: &[SpectralGroup]) -> Figure {
    let mut data = Vec::new();
    for group in groups {
        let legend = spectral_legend_name(&group.name);
        for curve in &group.curves {
            data.push(json!({
                "type": "scatter",
                "mode": "lines",
                "x": curve.wavelengths,
                "y": curve.intensities,
                "name": legend,
                "legendgroup": legend,
                "visible": true,
                "hovertemplate": format!(
                    "Group: {}<br>File: {}<br>Wavelength: %{{x}}<br>PFD: %{{y}}<extra></extra>",
                    legend, curve.source
                ),
            }));

            let peaks = curve.peak_points();
            if peaks.is_empty() {
                continue;
            }
            data.push(json!({
                "type": "scatter",
                "mode": "markers",
                "x": peaks.iter().map(|p| p.0).collect::<Vec<_>>(),
                "y": peaks.iter().map(|p| p.1).collect::<Vec<_>>(),
                "marker": { "symbol": "x", "size": 10, "color": "red" },
                "name": format!("Peaks {}", legend),
                "legendgroup": legend,
                "showlegend": false,
                "hovertemplate": format!(
                    "<b>Peak</b><br>Group: {}<br>File: {}<br>Wavelength: %{{x}}<br>PFD: %{{y}}<extra></extra>",
                    legend, curve.source
                ),
            }));
        }
    }

    Figure {
        data,
        layout: merge(
            base_layout(""),
            json!({
                "xaxis": { "title": { "text": "Wavelength (nm)" } },
                "yaxis": { "title": { "text": "PFD (μmol m⁻² s⁻¹)" } },
                "legend": { "title": { "text": "Group" } },
            }),
        ),
    }
}

/// Hides every trace whose `legendgroup` is not among the checked boxes.
const TOGGLE_SCRIPT: &str = r#"<script>
function updateGroups() {
    var checked = Array.from(document.querySelectorAll('.group-cb:checked')).map(cb => cb.value);
    var plot = document.getElementById('luxmap-plot');
    var visible = plot.data.map(trace => checked.includes(trace.legendgroup));
    Plotly.restyle(plot, {visible: visible});
}
document.querySelectorAll('.group-cb').forEach(cb => cb.addEventListener('change', updateGroups));
</script>"#;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON safe to embed inside a `<script>` element.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// A complete page: heading, optional group checkboxes, the plot and its script.
pub fn render_page(
    title: &str,
    heading: &str,
    figure: &Figure,
    toggles: bool,
    plotly_cdn: &str,
) -> Result<String> {
    let data = script_json(&Value::Array(figure.data.clone()))?;
    let layout = script_json(&figure.layout)?;

    let checkboxes: String = if toggles {
        figure
            .legend_groups()
            .iter()
            .map(|g| {
                let g = escape_html(g);
                format!(
                    "<label style=\"margin-right:18px;font-size:15px;\"><input type=\"checkbox\" class=\"group-cb\" value=\"{g}\" checked> {g}</label>"
                )
            })
            .collect()
    } else {
        String::new()
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body style="font-family:{font};">
<h2>{heading}</h2>
<div style="margin-bottom:12px;">{checkboxes}</div>
<div id="{div}" class="js-plotly-plot" style="width:100%;height:85vh;"></div>
<script>
Plotly.newPlot('{div}', {data}, {layout}, {{"displayModeBar": true}});
</script>
{script}
<p style="color:#888;font-size:12px;">Generated {generated}</p>
</body>
</html>
"#,
        title = escape_html(title),
        cdn = escape_html(plotly_cdn),
        font = FONT,
        heading = escape_html(heading),
        checkboxes = checkboxes,
        div = PLOT_DIV,
        data = data,
        layout = layout,
        script = if toggles { TOGGLE_SCRIPT } else { "" },
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
    ))
}

pub fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {:?}", path))?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

/// Heading used for surface pages.
pub fn surface_heading(method: InterpolationMethod) -> String {
    format!("Interpolated 3D surfaces ({})", method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxmap_schemas::spectral::SpectralCurve;

    fn grid() -> InterpolatedGrid {
        InterpolatedGrid {
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            z: vec![vec![1.0, f64::NAN], vec![2.0, 3.0]],
            method: InterpolationMethod::Linear,
        }
    }

    #[test]
    fn undefined_nodes_become_null() {
        let figure = surface_figure(&grid(), ZField::Ppfd);
        assert_eq!(figure.data[0]["z"][0][1], Value::Null);
        assert_eq!(figure.data[0]["z"][1][1], json!(3.0));
        assert_eq!(figure.data[0]["type"], "surface");
    }

    #[test]
    fn multi_surface_uses_group_palettes_and_legend_names() {
        let figure = multi_surface_figure(
            &[("dados_100A".to_string(), grid()), ("misc".to_string(), grid())],
            ZField::Pfd,
        );
        assert_eq!(figure.data[0]["name"], "B100%");
        assert_eq!(figure.data[0]["colorscale"][0][1], "rgb(13,71,161)");
        assert_eq!(figure.data[0]["showscale"], true);
        assert_eq!(figure.data[1]["name"], "misc");
        assert_eq!(figure.data[1]["colorscale"][1][1], "rgb(80,80,80)");
        assert_eq!(figure.data[1]["showscale"], false);
        assert_eq!(figure.legend_groups(), vec!["B100%".to_string(), "misc".to_string()]);
    }

    #[test]
    fn spectral_peaks_share_the_curve_legend_group() {
        let groups = vec![SpectralGroup {
            name: "0T".to_string(),
            curves: vec![SpectralCurve {
                group: "0T".to_string(),
                source: "uMOL_1.txt".to_string(),
                wavelengths: vec![400.0, 401.0, 402.0],
                intensities: vec![0.0, 2.0, 0.0],
                peaks: vec![1],
            }],
        }];
        let figure = spectral_figure(&groups);
        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[0]["legendgroup"], "RBW15%");
        assert_eq!(figure.data[1]["legendgroup"], "RBW15%");
        assert_eq!(figure.data[1]["x"], json!([401.0]));
        assert_eq!(figure.data[1]["marker"]["color"], "red");
    }

    #[test]
    fn page_embeds_figure_and_checkboxes() {
        let figure = multi_surface_figure(&[("0B".to_string(), grid())], ZField::Ppfd);
        let html = render_page("t", "Surfaces <3>", &figure, true, "https://cdn.example/plotly.js").unwrap();
        assert!(html.contains("Plotly.newPlot('luxmap-plot'"));
        assert!(html.contains("value=\"W15%\""));
        assert!(html.contains("Surfaces &lt;3&gt;"));
        assert!(html.contains("updateGroups"));
        assert!(html.contains("<script src=\"https://cdn.example/plotly.js\">"));

        let plain = render_page("t", "h", &scatter_figure(&[], ZField::Ppfd), false, "x").unwrap();
        assert!(!plain.contains("updateGroups"));
    }
}
