//! Small DSP helpers shared by the analysis and synthesis stages.

/// Symmetric Hann window of the given length.
pub fn hann_window(len: usize) -> Vec<f64> {
    if len <= 1 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / (len - 1) as f64;
            0.5 * (1.0 - angle.cos())
        })
        .collect()
}

/// Next power of two >= n (and >= 2).
pub fn next_pow2(n: usize) -> usize {
    n.max(2).next_power_of_two()
}

/// Linear interpolation of `values` at a fractional index position.
///
/// Positions are clamped to `[0, len - 1]`; integer positions return the
/// stored value exactly.
pub fn interp_at(values: &[f64], pos: f64) -> f64 {
    debug_assert!(!values.is_empty());
    if pos <= 0.0 {
        return values[0];
    }
    let last = values.len() - 1;
    if pos >= last as f64 {
        return values[last];
    }
    let i = pos.floor() as usize;
    let frac = pos - i as f64;
    if frac == 0.0 {
        values[i]
    } else {
        values[i] + (values[i + 1] - values[i]) * frac
    }
}

/// Piecewise-linear interpolation of a sampled contour `(xs, ys)` at `x`.
///
/// `xs` must be non-decreasing. Outside the sampled range the nearest end
/// value is returned.
pub fn interp_contour(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(!xs.is_empty());
    if x <= xs[0] {
        return ys[0];
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return ys[last];
    }
    // First index with xs[i] > x; the segment is [i - 1, i].
    let i = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    let span = x1 - x0;
    if span <= 0.0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / span
}

/// Extract `len` samples centered on `center`, zero-padded outside `x`.
pub fn extract_centered(x: &[f64], center: isize, len: usize) -> Vec<f64> {
    let half = (len / 2) as isize;
    (0..len as isize)
        .map(|j| {
            let idx = center - half + j;
            if idx >= 0 && (idx as usize) < x.len() {
                x[idx as usize]
            } else {
                0.0
            }
        })
        .collect()
}

/// Root-mean-square of a buffer.
pub fn rms(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = x.iter().map(|s| s * s).sum();
    (sum_sq / x.len() as f64).sqrt()
}
