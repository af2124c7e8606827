//! Forbid trailing whitespace at the end of lines.

use crate::linter::Problem;
use crate::rule::{Rule, RuleKind, RuleSettings};
use crate::stream::Line;

pub struct TrailingSpaces;

impl Rule for TrailingSpaces {
    fn id(&self) -> &'static str {
        "trailing-spaces"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Line
    }

    fn check_line(&self, _conf: &RuleSettings, line: &Line<'_>) -> Vec<Problem> {
        let content = line.content();
        // Report on the first blank character of the run, and only when that
        // character is a YAML whitespace (space or tab).
        let trimmed = content.trim_end_matches([' ', '\t', '\r', '\x0b', '\x0c']);
        if trimmed.len() != content.len()
            && matches!(content.as_bytes().get(trimmed.len()), Some(b' ' | b'\t'))
        {
            // Columns count characters, not bytes.
            return vec![Problem::new(
                line.line_no,
                trimmed.chars().count() + 1,
                "trailing spaces",
            )];
        }
        Vec::new()
    }
}
