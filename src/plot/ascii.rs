//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Charts:
//! - ECDF step curve of one column: `-` line
//! - monthly seasonality profile: `-` line with `o` at each month

use crate::domain::KeyPart;
use crate::stats::{Ecdf, GroupMean};

/// Render the ECDF of `ecdf` as a step curve over its value range.
pub fn render_ecdf_plot(ecdf: &Ecdf, label: &str, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = value_range(ecdf.values()) else {
        return format!("ECDF: {label} (no data)\n");
    };

    let curve: Vec<(f64, f64)> = (0..width)
        .map(|i| {
            let u = i as f64 / (width as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, ecdf.evaluate(x))
        })
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &curve, x_min, x_max, 0.0, 1.0);

    let mut out = format!("ECDF: {label} | x=[{x_min:.2}, {x_max:.2}] | y=[0, 1]\n");
    push_grid(&mut out, grid);
    out
}

/// Render mean values per calendar month (keys must be `[Month]`).
pub fn render_month_profile(
    means: &[GroupMean],
    label: &str,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(12);
    let height = height.max(5);

    let points: Vec<(f64, f64)> = means
        .iter()
        .filter_map(|m| match m.key.parts() {
            [KeyPart::Month(month)] if m.mean.is_finite() => Some((f64::from(*month), m.mean)),
            _ => None,
        })
        .collect();

    let Some((y_min, y_max)) = value_range(&points.iter().map(|p| p.1).collect::<Vec<_>>()) else {
        return format!("Seasonality: {label} (no data)\n");
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let (x_min, x_max) = (1.0, 12.0);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &points, x_min, x_max, y_min, y_max);
    for &(x, y) in &points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out =
        format!("Seasonality: mean {label} by month (1..12) | y=[{y_min:.1}, {y_max:.1}]\n");
    push_grid(&mut out, grid);
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

/// Min/max of finite values; a degenerate range is widened to one unit.
fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max - min < 1e-12 {
        return Some((min - 0.5, max + 0.5));
    }
    Some((min, max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
