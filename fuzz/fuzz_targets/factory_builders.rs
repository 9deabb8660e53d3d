#![no_main]

use arbitrary::Arbitrary;
use ffx_matrix::{
    diagonally_dominant, diagonally_dominant_condition_bound, ill_conditioned, near_singular,
    random_uniform, symmetric_positive_definite,
};
use ffx_oracle::{condition_number, solve};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct BuilderInput {
    n: u8,
    seed: u64,
    margin: f64,
    regularization: f64,
    low: f64,
    high: f64,
    perturbation: f64,
    eigenvalues: Vec<f64>,
}

fuzz_target!(|input: BuilderInput| {
    let n = usize::from(input.n % 8);

    // Every builder must reject bad parameters with an error, never panic.
    let _ = random_uniform(n, input.low, input.high, input.seed);
    let _ = near_singular(n, input.perturbation);
    let _ = symmetric_positive_definite(n, input.seed, input.regularization);
    let spectrum: Vec<f64> = input.eigenvalues.iter().copied().take(7).collect();
    let _ = ill_conditioned(&spectrum, input.seed);

    // Below this the margin vanishes in the row sum and dominance is lost.
    let margin = input.margin;
    if !(1e-3..=1e6).contains(&margin) {
        return;
    }
    if let Ok(a) = diagonally_dominant(n, input.seed, margin) {
        let cond = condition_number(&a);
        let bound = diagonally_dominant_condition_bound(n, margin);
        assert!(cond <= bound * (1.0 + 1e-9), "cond={cond} bound={bound}");
        assert!(solve(&a, &vec![1.0; n]).is_ok());
    }
});
