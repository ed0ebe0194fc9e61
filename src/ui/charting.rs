/// Solve-number points with times converted from milliseconds to seconds
pub fn to_seconds(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points.iter().map(|&(n, ms)| (n, ms / 1000.0)).collect()
}

/// Compute X (solve number) and Y (seconds) bounds for the times chart
pub fn compute_chart_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let last = points.iter().map(|p| p.0).fold(1.0, f64::max);
    let lowest = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let highest = points.iter().map(|p| p.1).fold(0.0, f64::max);

    // one second of headroom either side
    let y_min = if lowest.is_finite() {
        (lowest - 1.0).max(0.0).floor()
    } else {
        0.0
    };
    let mut y_max = (highest + 1.0).ceil();
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    ([1.0, last.max(2.0)], [y_min, y_max])
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Width of each histogram bar so `bins` bars with a one-cell gap fit in `width`.
pub fn bar_width(width: u16, bins: usize) -> u16 {
    if bins == 0 {
        return 1;
    }
    let per_bar = width.saturating_sub(2) as usize / bins;
    per_bar.saturating_sub(1).max(1) as u16
}
