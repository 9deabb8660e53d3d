#![no_main]

use arbitrary::Arbitrary;
use ffx_emit::{FixtureEmitter, Layout, TargetConfig, TestCase};
use ffx_matrix::Matrix;
use ffx_oracle::{ConditionBand, ToleranceSelector, diagnose};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct RenderInput {
    n: u8,
    flat: bool,
    values: Vec<f64>,
    name: String,
}

fuzz_target!(|input: RenderInput| {
    let n = 2 + usize::from(input.n % 5);
    let mut data = vec![0.0; n * n];
    for (slot, value) in data.iter_mut().zip(input.values.iter().copied()) {
        *slot = value;
    }
    if data.iter().any(|v| !(v.abs() <= 1e100)) {
        return;
    }
    let Ok(a) = Matrix::from_row_major(n, data) else {
        return;
    };
    let d = diagnose(&a);
    let Ok(tol) = ToleranceSelector::default().select(d.condition_number, None) else {
        return;
    };
    if !d.determinant.is_finite() {
        return;
    }
    let Ok(case) = TestCase::determinant(input.name.clone(), a, d.determinant, tol, d) else {
        return;
    };
    let layout = if input.flat {
        Layout::FlatRowMajor
    } else {
        Layout::NestedRows
    };
    let relative = case.tolerance().band != ConditionBand::Singular;
    let text = FixtureEmitter::new(TargetConfig::default().with_layout(layout)).render(&case);
    assert!(text.ends_with("}\n"));
    assert_eq!(text.matches("\nSUBCASE(\"").count(), 1);
    let check = text
        .lines()
        .find(|line| line.trim_start().starts_with("CHECK("));
    assert_eq!(check.map(|line| line.ends_with(".scale(0));")), Some(relative));
});
