//! Descriptive analysis of spectral curves.

/// Peaks must rise at least this fraction of the curve maximum above their surroundings.
pub const PROMINENCE_FRACTION: f64 = 0.05;

/// Indices of local maxima. A flat top counts once, at its middle sample
/// (rounded down); the first and last samples are never maxima.
pub fn local_maxima(y: &[f64]) -> Vec<usize> {
    let n = y.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let last = n - 1;
    let mut i = 1;
    while i < last {
        if y[i - 1] < y[i] {
            let mut ahead = i + 1;
            while ahead < last && y[ahead] == y[i] {
                ahead += 1;
            }
            if y[ahead] < y[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of the sample at `peak`: its height above the higher of the
/// lowest points reached on each side before meeting a higher sample.
pub fn prominence(y: &[f64], peak: usize) -> f64 {
    let top = y[peak];

    let mut left_min = top;
    for &v in y[..=peak].iter().rev() {
        if v > top {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = top;
    for &v in &y[peak..] {
        if v > top {
            break;
        }
        right_min = right_min.min(v);
    }

    top - left_min.max(right_min)
}

/// Local maxima whose prominence reaches `PROMINENCE_FRACTION` of the curve maximum.
pub fn detect_peaks(y: &[f64]) -> Vec<usize> {
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return Vec::new();
    }
    let threshold = PROMINENCE_FRACTION * max;
    local_maxima(y)
        .into_iter()
        .filter(|&p| prominence(y, p) >= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(wavelengths: &[f64], centre: f64, width: f64, height: f64) -> Vec<f64> {
        wavelengths
            .iter()
            .map(|w| height * (-((w - centre) / width).powi(2)).exp())
            .collect()
    }

    #[test]
    fn single_dominant_peak_at_550() {
        let wavelengths: Vec<f64> = (380..=780).map(f64::from).collect();
        let mut y = gaussian(&wavelengths, 550.0, 8.0, 2.0);
        // small ripple well under 5% of the maximum
        for (i, v) in y.iter_mut().enumerate() {
            *v += if i % 2 == 0 { 0.01 } else { 0.0 };
        }
        let peaks = detect_peaks(&y);
        assert_eq!(peaks.len(), 1);
        assert_eq!(wavelengths[peaks[0]], 550.0);
    }

    #[test]
    fn plateau_reports_its_middle() {
        assert_eq!(local_maxima(&[0.0, 1.0, 3.0, 3.0, 3.0, 1.0]), vec![3]);
        assert_eq!(local_maxima(&[0.0, 3.0, 3.0, 1.0]), vec![1]);
        // a plateau running into the last sample is not a maximum
        assert!(local_maxima(&[0.0, 1.0, 2.0, 2.0]).is_empty());
    }

    #[test]
    fn prominence_uses_the_higher_base() {
        let y = [0.0, 5.0, 1.0, 3.0, 2.0, 10.0, 0.0];
        // peak at 3 is bounded by 1.0 on the left and 2.0 on the right
        assert_eq!(prominence(&y, 3), 1.0);
        // the global maximum falls back to the lowest value on each side
        assert_eq!(prominence(&y, 5), 10.0);
    }

    #[test]
    fn small_bumps_are_filtered() {
        let y = [0.0, 100.0, 0.0, 3.0, 2.9, 0.0];
        assert_eq!(local_maxima(&y), vec![1, 3]);
        assert_eq!(detect_peaks(&y), vec![1]);
    }

    #[test]
    fn short_or_flat_curves_have_no_peaks() {
        assert!(detect_peaks(&[]).is_empty());
        assert!(detect_peaks(&[1.0, 2.0]).is_empty());
        assert!(detect_peaks(&[1.0; 10]).is_empty());
    }
}
