#![forbid(unsafe_code)]

//! Fixture text rendering for LU/determinant test cases.
//!
//! A [`TestCase`] carries inputs, the oracle's reference output and the
//! selected epsilon; [`FixtureEmitter`] turns it into a doctest `SUBCASE`
//! block for the target library. How matrices and vectors are declared is
//! delegated to a [`LayoutStrategy`], so nested-row and flat `mdspan`
//! output share one header and assertion path.

pub mod case;
pub mod emitter;
pub mod layout;
pub mod literal;
pub mod writer;

pub use case::{CaseError, CaseKind, Expected, TestCase};
pub use emitter::{BANNER_WIDTH, FixtureEmitter, TargetConfig};
pub use layout::{FlatRowMajor, Layout, LayoutStrategy, NestedRows};
pub use literal::{
    DIAGNOSTIC_PRECISION, LITERAL_PRECISION, cpp_literal, format_epsilon, format_scientific,
};
pub use writer::CodeWriter;
