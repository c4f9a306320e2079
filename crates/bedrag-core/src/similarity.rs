//! Vector similarity

/// Cosine similarity between two vectors.
///
/// Defined as 0 when either vector has zero norm or the lengths differ.
/// Accumulates in `f64` so very small or very large components neither
/// underflow to a zero norm nor overflow to infinity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let norm_a = squared_norm(a).sqrt();
    let norm_b = squared_norm(b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)) as f32
}

fn squared_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_one() {
        let vectors = [
            vec![1.0, 0.0, 0.0],
            vec![0.3, -2.5, 7.25],
            vec![1e-3, 1e-3, 1e-3, 1e-3],
            vec![-4.0],
            vec![1e-30, 1e-30],
            vec![1e20, 1e20],
            vec![f32::MAX, f32::MAX],
        ];

        for v in &vectors {
            assert!((cosine_similarity(v, v) - 1.0).abs() < 1e-5, "{:?}", v);
        }
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_independent() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }
}
