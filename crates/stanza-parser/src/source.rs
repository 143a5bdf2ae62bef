//! Line splitting and comment stripping.
//!
//! Every later stage works on [`SourceLine`]s: the text of one logical line
//! plus the span of the source line it came from.

use crate::span::Span;

const COMMENT_OPEN: &str = "<<#";
const COMMENT_CLOSE: &str = "#>>";

/// One line of the preprocessed line stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine {
    pub text: String,
    pub span: Span,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// The line with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Split source text into lines, dropping a trailing `\r` from each.
///
/// A trailing newline produces a final empty line, matching a plain split on
/// `\n`.
pub(crate) fn split_lines(source: &str) -> Vec<SourceLine> {
    let mut offset = 0;
    source
        .split('\n')
        .map(|raw| {
            let start = offset;
            offset += raw.len() + 1;
            let text = raw.strip_suffix('\r').unwrap_or(raw);
            SourceLine::new(text, Span::new(start..start + text.len()))
        })
        .collect()
}

/// Remove `<<#` ... `#>>` comment regions, delimiter lines included.
///
/// Delimiters are recognized by their left-trimmed prefix. An unterminated
/// comment runs to the end of input, and a closer with no opener is dropped
/// on its own.
pub(crate) fn strip_comments(lines: Vec<SourceLine>) -> Vec<SourceLine> {
    let mut in_comment = false;
    lines
        .into_iter()
        .filter(|line| {
            let head = line.text.trim_start();
            if head.starts_with(COMMENT_OPEN) {
                in_comment = true;
                return false;
            }
            if head.starts_with(COMMENT_CLOSE) {
                in_comment = false;
                return false;
            }
            !in_comment
        })
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn line_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("<<#".to_string()),
            Just("  <<# open".to_string()),
            Just("#>>".to_string()),
            Just("#>> close".to_string()),
            Just(String::new()),
            "[a-z <>#]{0,12}",
        ]
    }

    fn check_strip_idempotent(lines: &[String]) -> Result<(), TestCaseError> {
        let source = lines.join("\n");
        let once = strip_comments(split_lines(&source));
        let twice = strip_comments(once.clone());
        prop_assert_eq!(once, twice);
        Ok(())
    }

    fn check_no_delimiters_survive(lines: &[String]) -> Result<(), TestCaseError> {
        let source = lines.join("\n");
        for line in strip_comments(split_lines(&source)) {
            let head = line.text.trim_start();
            prop_assert!(!head.starts_with(COMMENT_OPEN));
            prop_assert!(!head.starts_with(COMMENT_CLOSE));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn strip_comments_is_idempotent(lines in prop::collection::vec(line_strategy(), 0..20)) {
            check_strip_idempotent(&lines)?;
        }

        #[test]
        fn stripped_output_has_no_delimiters(lines in prop::collection::vec(line_strategy(), 0..20)) {
            check_no_delimiters_survive(&lines)?;
        }
    }
}
