//! Require a final newline at the end of the file.

use crate::linter::Problem;
use crate::rule::{Rule, RuleKind, RuleSettings};
use crate::stream::Line;

pub struct NewLineAtEndOfFile;

impl Rule for NewLineAtEndOfFile {
    fn id(&self) -> &'static str {
        "new-line-at-end-of-file"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Line
    }

    fn check_line(&self, _conf: &RuleSettings, line: &Line<'_>) -> Vec<Problem> {
        // Only the unterminated final line can trip this, and only when it
        // actually holds content.
        if line.end == line.buffer.len() && line.end > line.start {
            return vec![Problem::new(
                line.line_no,
                line.content().chars().count() + 1,
                "no new line character at the end of file",
            )];
        }
        Vec::new()
    }
}
