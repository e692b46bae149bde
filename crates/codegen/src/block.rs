//! Line-oriented buffer for emitted Aseba code.
//!
//! Every buffer holds whole lines, each terminated by `\n`, indented relative
//! to the block that will contain them. Nesting a buffer prefixes each of its
//! lines with one indentation unit.

use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    text: String,
}

impl CodeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Append already formatted lines at the current level.
    pub fn append(&mut self, code: &str) {
        self.text.push_str(code);
    }

    /// Append `code` one level deeper.
    pub fn nest(&mut self, code: &str, unit: &str) {
        for line in code.lines() {
            if line.is_empty() {
                self.text.push('\n');
            } else {
                let _ = writeln!(self.text, "{}{}", unit, line);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<String> for CodeBlock {
    fn from(text: String) -> Self {
        CodeBlock { text }
    }
}

/// Visit every literal `_tmp[N]` index mentioned in `code`.
pub fn scratch_references(code: &str) -> impl Iterator<Item = usize> + '_ {
    code.match_indices("_tmp[").filter_map(move |(at, marker)| {
        let glued = code[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if glued {
            return None;
        }
        let rest = &code[at + marker.len()..];
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 || !rest[digits..].starts_with(']') {
            return None;
        }
        rest[..digits].parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_indents_each_line() {
        let mut inner = CodeBlock::new();
        inner.line("a = 1");
        inner.line("b = 2");
        let mut outer = CodeBlock::new();
        outer.line("if x == 0 then");
        outer.nest(inner.as_str(), "\t");
        outer.line("end");
        assert_eq!(outer.as_str(), "if x == 0 then\n\ta = 1\n\tb = 2\nend\n");
    }

    #[test]
    fn scratch_indices_are_found() {
        let refs: Vec<usize> = scratch_references("_tmp[0] = 1\ny = _tmp[12] * _tmp[x] + my_tmp[40]\n").collect();
        assert_eq!(refs, vec![0, 12]);
    }
}
