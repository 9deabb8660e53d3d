//! Data-layout conventions for fixture literals.
//!
//! Both layouts implement the same [`LayoutStrategy`] contract; the
//! emitter writes headers and assertions once and asks the strategy only
//! how to declare containers and views.

use std::str::FromStr;

use ffx_matrix::Matrix;
use serde::{Deserialize, Serialize};

use crate::emitter::TargetConfig;
use crate::literal::cpp_literal;
use crate::writer::CodeWriter;

/// How a layout declares fixture data in the target language.
pub trait LayoutStrategy: Sync {
    /// After this call `name` is usable as the layout's native matrix.
    fn declare_matrix(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, m: &Matrix);

    /// Plain value container with no view.
    fn declare_values(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]);

    /// After this call `name` is a mutable 1-D view over the values.
    fn declare_vector(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]);

    /// Declares pivot storage and returns the identifier of its 1-D view.
    fn declare_permutation(
        &self,
        w: &mut CodeWriter,
        target: &TargetConfig,
        name: &str,
        n: usize,
    ) -> String;

    /// Returns a 2-D view over a matrix declared with
    /// [`LayoutStrategy::declare_matrix`], emitting adapter code if needed.
    fn matrix_view(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, n: usize)
    -> String;

    fn determinant_call(&self, target: &TargetConfig, name: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `std::vector<std::vector<T>>` literals.
    #[default]
    NestedRows,
    /// Row-major `std::array` storage behind `mdspan` views.
    FlatRowMajor,
}

impl Layout {
    #[must_use]
    pub fn strategy(self) -> &'static dyn LayoutStrategy {
        match self {
            Self::NestedRows => &NestedRows,
            Self::FlatRowMajor => &FlatRowMajor,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NestedRows => "nested",
            Self::FlatRowMajor => "flat",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nested" | "nested_rows" => Ok(Self::NestedRows),
            "flat" | "flat_row_major" => Ok(Self::FlatRowMajor),
            other => Err(format!("unknown layout `{other}` (expected nested|flat)")),
        }
    }
}

fn joined(values: &[f64], scalar: &str) -> String {
    values
        .iter()
        .map(|v| cpp_literal(*v, scalar))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy)]
pub struct NestedRows;

impl LayoutStrategy for NestedRows {
    fn declare_matrix(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, m: &Matrix) {
        let scalar = &target.scalar_type;
        w.open(format!("std::vector<std::vector<{scalar}>> {name} = {{"));
        w.rows(m.rows().map(|row| format!("{{{}}}", joined(row, scalar))), "");
        w.close("};");
    }

    fn declare_values(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]) {
        let scalar = &target.scalar_type;
        w.line(format!(
            "std::vector<{scalar}> {name} = {{{}}};",
            joined(v, scalar)
        ));
    }

    fn declare_vector(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]) {
        let scalar = &target.scalar_type;
        self.declare_values(w, target, &format!("{name}_s"), v);
        w.line(format!(
            "auto {name} = mdspan<{scalar}, dextents<size_t, 1>>({name}_s.data(), {});",
            v.len()
        ));
    }

    fn declare_permutation(
        &self,
        w: &mut CodeWriter,
        target: &TargetConfig,
        name: &str,
        n: usize,
    ) -> String {
        let index = &target.index_type;
        w.line(format!("std::vector<{index}> {name}_s({n});"));
        w.line(format!(
            "auto {name} = mdspan<{index}, dextents<size_t, 1>>({name}_s.data(), {n});"
        ));
        name.to_owned()
    }

    fn matrix_view(
        &self,
        w: &mut CodeWriter,
        target: &TargetConfig,
        name: &str,
        n: usize,
    ) -> String {
        let scalar = &target.scalar_type;
        let view = format!("{name}_view");
        w.line(format!("std::vector<{scalar}> {name}_flat;"));
        w.line(format!(
            "for (auto const& row : {name}) {name}_flat.insert({name}_flat.end(), row.begin(), row.end());"
        ));
        w.line(format!(
            "auto {view} = mdspan<{scalar}, dextents<size_t, 2>>({name}_flat.data(), {n}, {n});"
        ));
        view
    }

    fn determinant_call(&self, target: &TargetConfig, name: &str) -> String {
        format!("{}({name})", target.determinant_fn)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlatRowMajor;

impl LayoutStrategy for FlatRowMajor {
    fn declare_matrix(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, m: &Matrix) {
        let scalar = &target.scalar_type;
        let n = m.dimension();
        w.open(format!("std::array<{scalar}, {}> {name}_s{{", n * n));
        w.rows(m.rows().map(|row| joined(row, scalar)), "};");
        w.dedent();
        w.line(format!(
            "auto {name} = mdspan<{scalar}, extents<size_t, {n}, {n}>>({name}_s.data());"
        ));
    }

    fn declare_values(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]) {
        let scalar = &target.scalar_type;
        w.line(format!(
            "std::array<{scalar}, {}> {name}{{{}}};",
            v.len(),
            joined(v, scalar)
        ));
    }

    fn declare_vector(&self, w: &mut CodeWriter, target: &TargetConfig, name: &str, v: &[f64]) {
        let scalar = &target.scalar_type;
        self.declare_values(w, target, &format!("{name}_s"), v);
        w.line(format!(
            "auto {name} = mdspan<{scalar}, extents<size_t, {}>>({name}_s.data());",
            v.len()
        ));
    }

    fn declare_permutation(
        &self,
        w: &mut CodeWriter,
        target: &TargetConfig,
        name: &str,
        n: usize,
    ) -> String {
        let index = &target.index_type;
        w.line(format!("std::array<{index}, {n}> {name}_s;"));
        w.line(format!(
            "auto {name} = mdspan<{index}, extents<size_t, {n}>>({name}_s.data());"
        ));
        name.to_owned()
    }

    fn matrix_view(
        &self,
        _w: &mut CodeWriter,
        _target: &TargetConfig,
        name: &str,
        _n: usize,
    ) -> String {
        name.to_owned()
    }

    fn determinant_call(&self, target: &TargetConfig, name: &str) -> String {
        format!("{}<{}>({name})", target.determinant_fn, target.scalar_type)
    }
}
