//! SVG line charts for the smoothed loss curves.

use std::fs;
use std::path::Path;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 500.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_LEFT: f64 = 80.0;
const GRID_LINES: usize = 5;

const COLOR_LINE: &str = "#3498db";
const COLOR_GRID: &str = "#ecf0f1";
const COLOR_AXIS: &str = "#2c3e50";
const FONT: &str = "Arial, sans-serif";

/// Renders `values` (x = position in the series) as an SVG line chart.
///
/// Non-finite values are skipped. An empty series yields axes only.
pub fn render_line_chart(title: &str, x_label: &str, y_label: &str, values: &[f64]) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let points: Vec<(usize, f64)> = values.iter().copied().enumerate()
        .filter(|(_, y)| y.is_finite())
        .collect();
    let (mut y_min, mut y_max) = points.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if points.is_empty() {
        y_min = 0.0;
        y_max = 1.0;
    } else if (y_max - y_min).abs() < 1e-12 {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let x_span = values.len().saturating_sub(1).max(1) as f64;

    let to_x = |i: usize| MARGIN_LEFT + i as f64 / x_span * plot_width;
    let to_y = |y: f64| MARGIN_TOP + plot_height - (y - y_min) / (y_max - y_min) * plot_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = CHART_WIDTH, h = CHART_HEIGHT
    ));
    svg.push_str(&format!(r#"<rect width="{}" height="{}" fill="white"/>"#, CHART_WIDTH, CHART_HEIGHT));
    svg.push_str(&format!(
        r#"<text x="{}" y="35" text-anchor="middle" font-family="{}" font-size="18" font-weight="bold" fill="{}">{}</text>"#,
        CHART_WIDTH / 2.0, FONT, COLOR_AXIS, escape_xml(title)
    ));

    for i in 0..=GRID_LINES {
        let frac = i as f64 / GRID_LINES as f64;
        let y = MARGIN_TOP + plot_height - frac * plot_height;
        let value = y_min + frac * (y_max - y_min);
        svg.push_str(&format!(
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1"/>"#,
            MARGIN_LEFT, MARGIN_LEFT + plot_width, COLOR_GRID
        ));
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="end" font-family="{}" font-size="12" fill="{}">{:.3}</text>"#,
            MARGIN_LEFT - 10.0, y + 4.0, FONT, COLOR_AXIS, value
        ));
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="{c}" stroke-width="2"/>"#,
        x0 = MARGIN_LEFT, x1 = MARGIN_LEFT + plot_width, y0 = MARGIN_TOP + plot_height, c = COLOR_AXIS
    ));
    svg.push_str(&format!(
        r#"<line x1="{x0}" y1="{y0}" x2="{x0}" y2="{y1}" stroke="{c}" stroke-width="2"/>"#,
        x0 = MARGIN_LEFT, y0 = MARGIN_TOP, y1 = MARGIN_TOP + plot_height, c = COLOR_AXIS
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="{}" font-size="14" fill="{}">{}</text>"#,
        MARGIN_LEFT + plot_width / 2.0, CHART_HEIGHT - 20.0, FONT, COLOR_AXIS, escape_xml(x_label)
    ));
    svg.push_str(&format!(
        r#"<text x="20" y="{h}" text-anchor="middle" font-family="{}" font-size="14" fill="{}" transform="rotate(-90 20 {h})">{}</text>"#,
        FONT, COLOR_AXIS, escape_xml(y_label), h = CHART_HEIGHT / 2.0
    ));

    if !points.is_empty() {
        let path: Vec<String> = points.iter()
            .map(|&(i, y)| format!("{:.2},{:.2}", to_x(i), to_y(y)))
            .collect();
        svg.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            path.join(" "), COLOR_LINE
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Writes the chart produced by `render_line_chart` to `path`.
pub fn write_line_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    values: &[f64],
    path: &Path,
) -> std::io::Result<()> {
    fs::write(path, render_line_chart(title, x_label, y_label, values))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_contains_one_vertex_per_finite_value() {
        let svg = render_line_chart("Loss", "chunk", "log10 loss", &[0.5, f64::NEG_INFINITY, 0.1, -0.2]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        let polyline = svg.split("<polyline points=\"").nth(1).unwrap();
        let points = polyline.split('"').next().unwrap();
        assert_eq!(points.split(' ').count(), 3);
    }

    #[test]
    fn empty_series_draws_axes_only() {
        let svg = render_line_chart("Empty", "x", "y", &[]);
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains("<line"));
    }

    #[test]
    fn titles_are_escaped() {
        let svg = render_line_chart("a < b & c", "x", "y", &[1.0]);
        assert!(svg.contains("a &lt; b &amp; c"));
    }
}
