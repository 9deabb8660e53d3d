#![no_main]

use arbitrary::Arbitrary;
use ffx_oracle::{ConditionBand, ToleranceSelector, ToleranceSource};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct SelectInput {
    condition_number: f64,
    override_epsilon: Option<f64>,
}

fuzz_target!(|input: SelectInput| {
    let selector = ToleranceSelector::default();
    match selector.select(input.condition_number, input.override_epsilon) {
        Ok(tol) => {
            assert!(tol.epsilon.is_finite() && tol.epsilon > 0.0);
            assert_eq!(tol.band, ConditionBand::classify(input.condition_number));
            if tol.source == ToleranceSource::Override {
                assert_eq!(Some(tol.epsilon), input.override_epsilon);
            }
        }
        Err(_) => {
            let value = input.override_epsilon.unwrap_or(1.0);
            assert!(!(value.is_finite() && value > 0.0));
        }
    }
});
