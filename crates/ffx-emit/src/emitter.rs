use std::io::{self, Write};

use ffx_oracle::{Diagnostics, Tolerance, ToleranceSource};
use serde::{Deserialize, Serialize};

use crate::case::{Expected, TestCase};
use crate::layout::{Layout, LayoutStrategy};
use crate::literal::{DIAGNOSTIC_PRECISION, cpp_literal, format_epsilon, format_scientific};
use crate::writer::CodeWriter;

/// Width of the `=` rules framing a section banner.
pub const BANNER_WIDTH: usize = 80;

/// Names and types of the doctest target the fixtures are written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub layout: Layout,
    pub scalar_type: String,
    pub index_type: String,
    pub determinant_fn: String,
    pub decompose_fn: String,
    pub back_substitute_fn: String,
    pub indent: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            layout: Layout::NestedRows,
            scalar_type: String::from("double"),
            index_type: String::from("int"),
            determinant_fn: String::from("det"),
            decompose_fn: String::from("hd::lu_decomp"),
            back_substitute_fn: String::from("hd::lu_backsubs"),
            indent: 4,
        }
    }
}

impl TargetConfig {
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// Renders [`TestCase`]s as doctest `SUBCASE` blocks.
#[derive(Debug, Clone, Default)]
pub struct FixtureEmitter {
    target: TargetConfig,
}

impl FixtureEmitter {
    #[must_use]
    pub fn new(target: TargetConfig) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> &TargetConfig {
        &self.target
    }

    #[must_use]
    pub fn section_banner(&self, title: &str) -> String {
        let rule = "=".repeat(BANNER_WIDTH);
        format!("\n{rule}\n{title}\n{rule}\n")
    }

    /// `//`-framed comment block opening a generated file.
    #[must_use]
    pub fn preamble(&self, lines: &[&str]) -> String {
        let rule = "/".repeat(BANNER_WIDTH);
        let mut out = format!("{rule}\n");
        for line in lines {
            out.push_str(&format!("// {line}\n"));
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }

    /// Closing banner followed by `//` comment lines; blank entries become
    /// bare `//` separators.
    #[must_use]
    pub fn closing_notes(&self, title: &str, lines: &[&str]) -> String {
        let mut out = self.section_banner(title);
        for line in lines {
            if line.is_empty() {
                out.push_str("//\n");
            } else {
                out.push_str(&format!("// {line}\n"));
            }
        }
        out
    }

    #[must_use]
    pub fn render(&self, case: &TestCase) -> String {
        let strategy = self.target.layout.strategy();
        let mut w = CodeWriter::new(self.target.indent);
        w.blank();
        write_header(&mut w, case.name(), case.diagnostics(), case.tolerance());
        w.line(format!("SUBCASE(\"{}\")", escape_string_literal(case.name())));
        w.open("{");
        match case.expected() {
            Expected::Determinant(value) => {
                self.determinant_body(&mut w, strategy, case, *value);
            }
            Expected::Solution(solution) => {
                self.solver_body(&mut w, strategy, case, solution);
            }
        }
        w.close("}");
        w.finish()
    }

    pub fn emit<W: Write>(&self, case: &TestCase, out: &mut W) -> io::Result<()> {
        out.write_all(self.render(case).as_bytes())
    }

    pub fn emit_banner<W: Write>(&self, title: &str, out: &mut W) -> io::Result<()> {
        out.write_all(self.section_banner(title).as_bytes())
    }

    fn determinant_body(
        &self,
        w: &mut CodeWriter,
        strategy: &dyn LayoutStrategy,
        case: &TestCase,
        determinant: f64,
    ) {
        let t = &self.target;
        w.line("// Matrix A");
        strategy.declare_matrix(w, t, "A", case.matrix());
        w.line("// Expected determinant");
        w.line(format!(
            "{} const det_expected = {};",
            t.scalar_type,
            cpp_literal(determinant, &t.scalar_type)
        ));
        self.epsilon_line(w, case.tolerance());
        w.blank();
        let scale = if case.approx_scale() == 0.0 {
            ".scale(0)"
        } else {
            ""
        };
        w.line(format!(
            "CHECK({} == doctest::Approx(det_expected).epsilon(eps){scale});",
            strategy.determinant_call(t, "A")
        ));
    }

    fn solver_body(
        &self,
        w: &mut CodeWriter,
        strategy: &dyn LayoutStrategy,
        case: &TestCase,
        solution: &[f64],
    ) {
        let t = &self.target;
        let n = case.matrix().dimension();
        w.line("// Matrix A");
        strategy.declare_matrix(w, t, "m", case.matrix());
        w.line("// Right-hand side b");
        strategy.declare_vector(w, t, "rhs", case.rhs().unwrap_or_default());
        w.line("// Expected solution x");
        strategy.declare_values(w, t, "x_expected", solution);
        let perm = strategy.declare_permutation(w, t, "m_perm", n);
        self.epsilon_line(w, case.tolerance());
        w.line(format!(
            "{} const x_scale = {};",
            t.scalar_type,
            cpp_literal(case.solution_scale().unwrap_or(1.0), &t.scalar_type)
        ));
        w.blank();
        w.line("// Solve system");
        let view = strategy.matrix_view(w, t, "m", n);
        w.line(format!("{}({view}, {perm});", t.decompose_fn));
        w.line(format!("{}({view}, {perm}, rhs);", t.back_substitute_fn));
        w.blank();
        w.line("// Verify solution");
        w.open(format!("for (size_t i = 0; i < {n}; ++i) {{"));
        w.line("CHECK(std::abs(rhs[i] - x_expected[i]) < eps * x_scale);");
        w.close("}");
    }

    fn epsilon_line(&self, w: &mut CodeWriter, tolerance: &Tolerance) {
        w.line(format!(
            "{} const eps = {};",
            self.target.scalar_type,
            format_epsilon(tolerance.epsilon)
        ));
    }
}

fn write_header(w: &mut CodeWriter, name: &str, d: &Diagnostics, tolerance: &Tolerance) {
    let sci = |v: f64| format_scientific(v, DIAGNOSTIC_PRECISION);
    w.line(format!("// {}", name.replace('\n', " ")));
    w.line(format!("// Matrix size: {0}x{0}", d.dimension));
    w.line(format!("// Determinant: {}", sci(d.determinant)));
    w.line(format!("// Condition number: {}", sci(d.condition_number)));
    w.line(format!(
        "// Eigenvalues: min={}, max={}",
        sci(d.min_eigenvalue_magnitude),
        sci(d.max_eigenvalue_magnitude)
    ));
    w.line(format!("// Eigenvalue ratio: {}", sci(d.eigenvalue_ratio())));
    let source = match tolerance.source {
        ToleranceSource::Table => "from table",
        ToleranceSource::Override => "explicit override",
    };
    w.line(format!(
        "// Tolerance: {} ({}, {source})",
        format_epsilon(tolerance.epsilon),
        tolerance.band.label()
    ));
}

fn escape_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}
