use num_complex::Complex64;
use proptest::prelude::*;

use fockspace::phase_space::{coherent_density_matrix, coherent_state};

fn norm_sqr(n: usize, alpha: Complex64) -> f64 {
    coherent_state(n, alpha).iter().map(|a| a.norm_sqr()).sum()
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

#[test]
fn test_zero_displacement_is_vacuum() {
    for n in 1..12 {
        let state = coherent_state(n, Complex64::new(0.0, 0.0));
        assert_eq!(state[0], Complex64::new(1.0, 0.0));
        for k in 1..n {
            assert_eq!(state[k], Complex64::new(0.0, 0.0));
        }
    }
}

#[test]
fn test_matches_closed_form_amplitudes() {
    let alpha = Complex64::new(1.3, -0.7);
    let state = coherent_state(12, alpha);
    let prefactor = (-alpha.norm_sqr() / 2.0).exp();

    for k in 0..12 {
        let expected = alpha.powu(k as u32) * prefactor / factorial(k).sqrt();
        assert!(
            (state[k] - expected).norm() < 1e-12,
            "amplitude {} differs: {} vs {}",
            k,
            state[k],
            expected
        );
    }
}

#[test]
fn test_norm_approaches_one_with_truncation() {
    let alpha = Complex64::new(2.0, 0.0);
    let coarse = norm_sqr(5, alpha);
    let medium = norm_sqr(20, alpha);
    let fine = norm_sqr(60, alpha);

    assert!(coarse < medium);
    assert!(medium <= fine);
    assert!((fine - 1.0).abs() < 1e-12);
}

#[test]
fn test_density_matrix_is_outer_product() {
    let alpha = Complex64::new(0.4, 0.9);
    let ket = coherent_state(8, alpha);
    let rho = coherent_density_matrix(8, alpha);

    assert_eq!(rho.dim(), (8, 8));
    for i in 0..8 {
        for j in 0..8 {
            assert_eq!(rho[[i, j]], ket[i] * ket[j].conj());
        }
    }

    let trace: f64 = rho.diag().iter().map(|c| c.re).sum();
    assert!((trace - norm_sqr(8, alpha)).abs() < 1e-15);
}

proptest! {
    #[test]
    fn prop_truncated_norm_never_exceeds_one(
        n in 1usize..48,
        re in -4.0f64..4.0,
        im in -4.0f64..4.0,
    ) {
        let total = norm_sqr(n, Complex64::new(re, im));
        prop_assert!(total <= 1.0 + 1e-12, "norm {} for n = {}", total, n);
        prop_assert!(total > 0.0);
    }
}
