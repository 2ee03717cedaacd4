use ndarray::Array1;

/// Scales a sparse `(index, weight)` vector to unit L2 norm in place.
pub(crate) fn normalize_sparse(vec: &mut [(usize, f64)]) {
    let norm: f64 = vec.iter().map(|&(_, x)| x * x).sum::<f64>().sqrt();
    if norm > 1e-10 {
        for (_, x) in vec.iter_mut() {
            *x /= norm;
        }
    }
}

/// Numerically stable `ln(Σ exp(x_i))`.
pub(crate) fn log_sum_exp(values: &Array1<f64>) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_sparse() {
        let mut v = vec![(0, 3.0), (4, 4.0)];
        normalize_sparse(&mut v);
        assert!((v[0].1 - 0.6).abs() < 1e-12);
        assert!((v[1].1 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_vector_is_untouched() {
        let mut v = vec![(1, 0.0)];
        normalize_sparse(&mut v);
        assert_eq!(v, vec![(1, 0.0)]);
    }

    #[test]
    fn test_log_sum_exp_large_values() {
        let values = array![1000.0, 1000.0];
        let result = log_sum_exp(&values);
        assert!((result - (1000.0 + 2f64.ln())).abs() < 1e-9);
    }
}
