//! Histogram binning and the kernel density overlay.

use crate::types::Histogram;

/// Points evaluated along the density curve.
pub const DENSITY_GRID_POINTS: usize = 200;

/// Bin the finite values into `bins` equal-width bins.
///
/// The last bin is closed on the right so the maximum lands in it. A
/// constant sample is centred in a unit-wide range. Returns `None` when there
/// are no finite values or `bins` is 0.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let bin_width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let density = density_curve(&finite, min, max, bin_width);

    Some(Histogram {
        min,
        max,
        bin_width,
        counts,
        density,
    })
}

/// Bandwidth by Scott's rule: `std * n^(-1/5)`, sample standard deviation.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);
    (bandwidth > 0.0).then_some(bandwidth)
}

/// Gaussian KDE over `[min, max]`, scaled so it overlays a count histogram.
///
/// Empty when the bandwidth is undefined (fewer than two values or zero
/// spread).
fn density_curve(values: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<(f64, f64)> {
    let Some(h) = scott_bandwidth(values) else {
        return Vec::new();
    };

    let n = values.len() as f64;
    let norm = 1.0 / (n * h * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n * bin_width;
    let step = (max - min) / (DENSITY_GRID_POINTS - 1) as f64;

    (0..DENSITY_GRID_POINTS)
        .map(|i| {
            let x = min + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / h;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let hist = histogram(&values, 5).unwrap();

        assert_eq!(hist.min, 0.0);
        assert_eq!(hist.max, 10.0);
        assert_eq!(hist.bin_width, 2.0);
        assert_eq!(hist.counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(hist.total(), 6);
    }

    #[test]
    fn test_histogram_skips_non_finite() {
        let values = [f64::NAN, 5.0, f64::INFINITY, 7.0];
        let hist = histogram(&values, 2).unwrap();
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.counts, vec![1, 1]);
    }

    #[test]
    fn test_histogram_constant_sample() {
        let hist = histogram(&[3.0, 3.0, 3.0], 4).unwrap();
        assert_eq!(hist.min, 2.5);
        assert_eq!(hist.max, 3.5);
        assert_eq!(hist.total(), 3);
        // zero spread has no density curve
        assert!(hist.density.is_empty());
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).is_none());
        assert!(histogram(&[f64::NAN], 20).is_none());
        assert!(histogram(&[1.0], 0).is_none());
    }

    #[test]
    fn test_density_curve_tracks_counts() {
        let values: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let hist = histogram(&values, 10).unwrap();

        assert_eq!(hist.density.len(), DENSITY_GRID_POINTS);
        assert_eq!(hist.density.first().unwrap().0, hist.min);
        let peak = hist
            .density
            .iter()
            .map(|(_, y)| *y)
            .fold(0.0, f64::max);
        // roughly the height of a 10-count bar
        assert!(peak > 5.0 && peak < 20.0, "peak was {peak}");
    }

    #[test]
    fn test_scott_bandwidth() {
        assert!(scott_bandwidth(&[1.0]).is_none());
        assert!(scott_bandwidth(&[2.0, 2.0]).is_none());
        let h = scott_bandwidth(&[1.0, 3.0]).unwrap();
        let expected = 2.0f64.sqrt() * 2.0f64.powf(-0.2);
        assert!((h - expected).abs() < 1e-12);
    }
}
