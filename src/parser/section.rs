//! A named block of raw mission lines.

/// One `[name]` block. Lines are stored trimmed, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Index of the first line satisfying `pred`.
    pub fn position(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.lines.iter().position(|l| pred(l))
    }

    /// Index of the last line satisfying `pred`.
    pub fn rposition(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.lines.iter().rposition(|l| pred(l))
    }
}
