//! Column statistics on top of polars chunked arrays.
//!
//! Aggregates come straight from polars (`mean`, `median`, `std`, `min`,
//! `max`). The helpers here pin the quantile method and turn undefined
//! results into `None` instead of NaN.

use polars::prelude::{cov, ChunkFilter, ChunkQuantile, ChunkVar, Float64Chunked, QuantileMethod};

/// Non-null values in the column.
pub fn count(values: &Float64Chunked) -> usize {
    values.len() - values.null_count()
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &Float64Chunked, q: f64) -> Option<f64> {
    values.quantile(q, QuantileMethod::Linear).ok().flatten()
}

/// Standard deviation with `ddof` delta degrees of freedom
/// (0 for population, 1 for sample).
pub fn std_dev(values: &Float64Chunked, ddof: u8) -> Option<f64> {
    if count(values) <= ddof as usize {
        return None;
    }
    values.std(ddof).filter(|s| s.is_finite())
}

/// Pearson correlation over the rows where both columns have a value.
pub fn pearson(xs: &Float64Chunked, ys: &Float64Chunked) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    let both = xs.is_not_null() & ys.is_not_null();
    let xs = xs.filter(&both).ok()?;
    let ys = ys.filter(&both).ok()?;
    if xs.len() < 2 {
        return None;
    }
    cov::pearson_corr(&xs, &ys).filter(|r| r.is_finite())
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::NewChunkedArray;

    fn floats(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("x".into(), values)
    }

    #[test]
    fn test_quartiles_interpolate() {
        let values = floats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(quantile(&values, 0.25), Some(1.75));
        assert_eq!(quantile(&values, 0.75), Some(3.25));
        assert_eq!(quantile(&floats(&[]), 0.5), None);
    }

    #[test]
    fn test_population_and_sample_std() {
        let values = floats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(std_dev(&values, 0), Some(2.0));
        let sample = std_dev(&values, 1).unwrap();
        assert!((sample - 2.138_089_935).abs() < 1e-6);
        assert_eq!(std_dev(&floats(&[1.0]), 1), None);
    }

    #[test]
    fn test_pearson_pairwise_complete() {
        let xs = floats(&[1.0, 2.0, 3.0]);
        assert!((pearson(&xs, &floats(&[2.0, 4.0, 6.0])).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &floats(&[3.0, 2.0, 1.0])).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &floats(&[1.0, 1.0, 1.0])), None);

        let gappy = Float64Chunked::from_slice_options("y".into(), &[Some(2.0), None, Some(6.0)]);
        assert!((pearson(&xs, &gappy).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(70000.0, 2), 70000.0);
    }
}
