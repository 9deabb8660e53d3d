/// Indented line buffer shared by the emitter and the layout strategies.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    out: String,
    depth: usize,
    unit: usize,
}

impl CodeWriter {
    #[must_use]
    pub fn new(unit: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            unit,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out
                .extend(std::iter::repeat_n(' ', self.depth * self.unit));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text`, then indent until the matching [`CodeWriter::close`].
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    pub fn close(&mut self, text: impl AsRef<str>) {
        self.dedent();
        self.line(text);
    }

    /// End an [`CodeWriter::open`] block whose closer was already written.
    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Comma-separated rows, one per line, with a trailing comma on all but
    /// the last row and `last_suffix` after the last one.
    pub fn rows<I>(&mut self, rows: I, last_suffix: &str)
    where
        I: ExactSizeIterator<Item = String>,
    {
        let count = rows.len();
        for (idx, row) in rows.enumerate() {
            if idx + 1 == count {
                self.line(format!("{row}{last_suffix}"));
            } else {
                self.line(format!("{row},"));
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}
