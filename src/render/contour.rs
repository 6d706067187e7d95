//! Contour level selection and iso-line extraction.
//!
//! Filled contours are banded per grid cell by [`band_index`]; line
//! contours are extracted with marching squares in fractional grid
//! coordinates and chained into polylines so labels can sit on them.

use std::collections::HashMap;

/// Contour levels bracketing a data range: from `round(min) - step` up to
/// (exclusive) `round(max) + step`, in increments of `step`.
///
/// A constant field therefore gets exactly one band around its value.
pub fn level_range(min: f64, max: f64, step: f64) -> Vec<f64> {
    assert!(step > 0.0, "level step must be positive");
    let start = min.round() - step;
    let stop = max.round() + step;

    let mut levels = Vec::new();
    let mut v = start;
    let mut k = 0u32;
    while v < stop - 1e-9 {
        levels.push(v);
        k += 1;
        v = start + k as f64 * step;
    }
    levels
}

/// Evenly spaced levels `start, start+step, ...` below `stop` (exclusive),
/// matching half-open range semantics.
pub fn level_arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    assert!(step > 0.0, "level step must be positive");
    let mut levels = Vec::new();
    let mut k = 0u32;
    loop {
        let v = start + k as f64 * step;
        if v >= stop - 1e-9 {
            break;
        }
        levels.push(v);
        k += 1;
    }
    levels
}

/// Band index of a value within sorted levels: `Some(k)` when
/// `levels[k] <= v < levels[k+1]`, `None` outside the level range.
pub fn band_index(levels: &[f64], v: f64) -> Option<usize> {
    if levels.len() < 2 || !v.is_finite() {
        return None;
    }
    if v < levels[0] || v >= levels[levels.len() - 1] {
        return None;
    }
    let mut k = 0;
    while k + 2 < levels.len() && v >= levels[k + 1] {
        k += 1;
    }
    Some(k)
}

/// Extract iso-lines of `data` at `level` via marching squares.
///
/// Returns polylines in fractional grid coordinates `(x = i, y = j)`.
/// Cells touching NaN are skipped, truncating lines at masked regions.
pub fn iso_lines(data: &[Vec<f32>], level: f64) -> Vec<Vec<(f64, f64)>> {
    let ny = data.len();
    let nx = data[0].len();
    let mut segments: Vec<((f64, f64), (f64, f64))> = Vec::new();

    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let corners = [
                data[j][i] as f64,       // bottom-left
                data[j][i + 1] as f64,   // bottom-right
                data[j + 1][i + 1] as f64, // top-right
                data[j + 1][i] as f64,   // top-left
            ];
            if corners.iter().any(|v| !v.is_finite()) {
                continue;
            }

            // Edge crossings in cell order: bottom, right, top, left
            let edges = [
                ((i, j), (i + 1, j), corners[0], corners[1]),
                ((i + 1, j), (i + 1, j + 1), corners[1], corners[2]),
                ((i + 1, j + 1), (i, j + 1), corners[2], corners[3]),
                ((i, j + 1), (i, j), corners[3], corners[0]),
            ];

            let mut crossings: Vec<(f64, f64)> = Vec::with_capacity(4);
            for &((xa, ya), (xb, yb), va, vb) in &edges {
                let above_a = va >= level;
                let above_b = vb >= level;
                if above_a != above_b {
                    let t = (level - va) / (vb - va);
                    let x = xa as f64 + t * (xb as f64 - xa as f64);
                    let y = ya as f64 + t * (yb as f64 - ya as f64);
                    crossings.push((x, y));
                }
            }

            match crossings.len() {
                2 => segments.push((crossings[0], crossings[1])),
                4 => {
                    // Saddle cell: keep the default pairing
                    segments.push((crossings[0], crossings[1]));
                    segments.push((crossings[2], crossings[3]));
                }
                _ => {}
            }
        }
    }

    chain_segments(segments)
}

/// Join segments sharing endpoints into polylines.
fn chain_segments(segments: Vec<((f64, f64), (f64, f64))>) -> Vec<Vec<(f64, f64)>> {
    let quantize = |p: (f64, f64)| ((p.0 * 1e6).round() as i64, (p.1 * 1e6).round() as i64);

    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, &(a, b)) in segments.iter().enumerate() {
        by_endpoint.entry(quantize(a)).or_default().push(idx);
        by_endpoint.entry(quantize(b)).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut line = vec![a, b];

        // Grow at the tail, then at the head
        for head in [false, true] {
            loop {
                let tip = if head { line[0] } else { line[line.len() - 1] };
                let key = quantize(tip);
                let next = by_endpoint
                    .get(&key)
                    .and_then(|ids| ids.iter().copied().find(|&id| !used[id]));
                let Some(id) = next else { break };
                used[id] = true;
                let (sa, sb) = segments[id];
                let other = if quantize(sa) == key { sb } else { sa };
                if head {
                    line.insert(0, other);
                } else {
                    line.push(other);
                }
            }
        }
        lines.push(line);
    }

    lines
}
