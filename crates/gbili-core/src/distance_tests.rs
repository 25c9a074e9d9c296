//! Tests for `distance` module

use super::distance::*;

fn scalar_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[test]
fn test_euclidean_distance() {
    let a = vec![0.0, 0.0, 0.0];
    let b = vec![3.0, 4.0, 0.0];
    let distance = euclidean(&a, &b);
    assert!((distance - 5.0).abs() < 1e-6);
}

#[test]
fn test_euclidean_identical_vectors_is_zero() {
    let a = vec![1.5; 19];
    assert_eq!(euclidean(&a, &a), 0.0);
}

#[test]
fn test_squared_euclidean_matches_scalar_across_remainders() {
    // Lengths straddle the 8-lane boundary to exercise the remainder loop.
    for len in [1usize, 7, 8, 9, 16, 17, 33] {
        let a: Vec<f32> = (0..len).map(|i| i as f32 * 0.25).collect();
        let b: Vec<f32> = (0..len).map(|i| (len - i) as f32 * 0.5).collect();

        let simd = squared_euclidean(&a, &b);
        let scalar = scalar_squared(&a, &b);

        assert!(
            (simd - scalar).abs() <= scalar * 1e-5,
            "len={len}: simd={simd} scalar={scalar}"
        );
    }
}

#[test]
fn test_distance_is_symmetric_bitwise() {
    let a: Vec<f32> = (0..21).map(|i| (i as f32).sin()).collect();
    let b: Vec<f32> = (0..21).map(|i| (i as f32).cos()).collect();

    assert_eq!(euclidean(&a, &b).to_bits(), euclidean(&b, &a).to_bits());
}

#[test]
#[should_panic(expected = "feature vectors differ in length")]
fn test_dimension_mismatch_panics() {
    let _ = euclidean(&[1.0, 2.0], &[1.0]);
}

#[test]
fn test_edge_weight_bounds() {
    assert_eq!(edge_weight(0.0), 1.0);
    assert!((edge_weight(1.0) - 0.5).abs() < 1e-7);
    assert!(edge_weight(7.0) < edge_weight(1.0));
    assert!(edge_weight(1e6) > 0.0);
}
