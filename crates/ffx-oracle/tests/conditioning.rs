//! Property tests for matrix-family conditioning guarantees.
//!
//! Convention: test_{family}_{property}
//!
//! Seed replay: `PROPTEST_CASES=1000 cargo test -p ffx-oracle --test conditioning`
//! Reproduce: `PROPTEST_SEED=<seed> cargo test -p ffx-oracle --test conditioning`

use ffx_matrix::{
    diagonally_dominant, diagonally_dominant_condition_bound, ill_conditioned, near_singular,
    spd_condition_bound, symmetric_positive_definite,
};
use ffx_oracle::{ConditionBand, condition_number, determinant, diagnose, solve};
use proptest::prelude::*;

// ═══════════════════════════════════════════════════════════════
// Property 1: diagonally dominant matrices stay below their bound
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_diagonally_dominant_condition_below_bound(
        seed in any::<u64>(),
        n in 2usize..9,
        margin in 0.5f64..10.0,
    ) {
        let a = diagonally_dominant(n, seed, margin).expect("valid parameters");
        let cond = condition_number(&a);
        let bound = diagonally_dominant_condition_bound(n, margin);
        prop_assert!(cond.is_finite());
        prop_assert!(cond <= bound, "n={n} seed={seed} cond={cond} bound={bound}");
    }

    #[test]
    fn test_diagonally_dominant_solve_always_succeeds(
        seed in any::<u64>(),
        n in 2usize..7,
    ) {
        let a = diagonally_dominant(n, seed, 1.0).expect("valid parameters");
        let b = vec![1.0; n];
        prop_assert!(solve(&a, &b).is_ok());
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 2: SPD matrices stay below their bound
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_spd_condition_below_bound(
        seed in any::<u64>(),
        n in 2usize..9,
        regularization in 0.05f64..2.0,
    ) {
        let a = symmetric_positive_definite(n, seed, regularization).expect("valid parameters");
        let cond = condition_number(&a);
        let bound = spd_condition_bound(n, regularization);
        prop_assert!(cond <= bound * (1.0 + 1e-12), "n={n} seed={seed} cond={cond} bound={bound}");
        prop_assert!(determinant(&a) > 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 3: constructed spectra give the requested condition number
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_ill_conditioned_realizes_requested_ratio(
        seed in any::<u64>(),
        exponent in 1i32..9,
    ) {
        let smallest = 10f64.powi(-exponent);
        let a = ill_conditioned(&[smallest, 0.5, 1.0], seed).expect("valid spectrum");
        let cond = condition_number(&a);
        let requested = 1.0 / smallest;
        // Forming QΛQᵀ perturbs the smallest eigenvalue by about ε·‖A‖.
        let slack = 1e-14 * requested;
        prop_assert!(
            (cond / requested - 1.0).abs() < 1e-6 + slack,
            "seed={seed} requested={requested} realized={cond}"
        );
        let d = diagnose(&a);
        prop_assert!((d.eigenvalue_ratio() / requested - 1.0).abs() < 1e-6 + slack);
    }
}

#[test]
fn test_near_singular_condition_tracks_perturbation() {
    let mut previous = 0.0;
    for perturbation in [1e-2, 1e-4, 1e-6, 1e-8, 1e-10] {
        let cond = condition_number(&near_singular(3, perturbation).expect("valid"));
        assert!(cond > previous, "perturbation={perturbation} cond={cond}");
        assert!(cond > 1.0 / perturbation, "perturbation={perturbation} cond={cond}");
        previous = cond;
    }
    let band = ConditionBand::classify(previous);
    assert_eq!(band, ConditionBand::Severe);
}
