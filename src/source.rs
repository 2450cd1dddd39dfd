use std::ops::Range;

/// Program text together with its line records.
///
/// Lines are stored 0-indexed; diagnostics add one when they print them.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub text: String,
    pub lines: Vec<String>,
    line_starts: Vec<usize>,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Source {
            name: name.into(),
            text,
            lines,
            line_starts,
        }
    }

    /// 0-based line containing the byte at `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    pub fn line(&self, line: usize) -> &str {
        self.lines.get(line).map(String::as_str).unwrap_or("")
    }

    /// Lines `start..=end`, each tab-indented and newline-terminated.
    pub fn block(&self, start: usize, end: usize) -> String {
        (start..=end.max(start))
            .map(|i| format!("\t{}\n", self.line(i)))
            .collect()
    }

    pub fn slice(&self, span: &Range<usize>) -> &str {
        self.text.get(span.clone()).unwrap_or("")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_line_lookup() {
        let source = Source::new("test", "int x = 1;\nprint x;\r\n\nprintln x;");
        assert_eq!(source.lines.len(), 4);
        assert_eq!(source.line(1), "print x;");
        assert_eq!(source.line_of(0), 0);
        assert_eq!(source.line_of(10), 0);
        assert_eq!(source.line_of(11), 1);
        assert_eq!(source.line_of(source.text.len()), 3);
        assert_eq!(source.block(0, 1), "\tint x = 1;\n\tprint x;\n");
    }
}
