//! Limit consecutive blank lines.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleKind, RuleSettings};
use crate::stream::Line;

pub struct EmptyLines;

impl Rule for EmptyLines {
    fn id(&self) -> &'static str {
        "empty-lines"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Line
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("max", OptionType::Int, 2),
            OptionSpec::new("max-start", OptionType::Int, 0),
            OptionSpec::new("max-end", OptionType::Int, 0),
        ]
    }

    fn check_line(&self, conf: &RuleSettings, line: &Line<'_>) -> Vec<Problem> {
        let buf = line.buffer.as_bytes();
        if line.start != line.end || line.end >= buf.len() {
            return Vec::new();
        }
        // Only the last blank line of a run reports.
        if buf[line.end..].starts_with(b"\n\n") || buf[line.end..].starts_with(b"\r\n\r\n") {
            return Vec::new();
        }

        let mut blank_lines = 0usize;
        let mut start = line.start;
        while start >= 2 && &buf[start - 2..start] == b"\r\n" {
            blank_lines += 1;
            start -= 2;
        }
        while start >= 1 && buf[start - 1] == b'\n' {
            blank_lines += 1;
            start -= 1;
        }

        let mut max = conf.int("max");
        if start == 0 {
            // The first line has no preceding newline to count.
            blank_lines += 1;
            max = conf.int("max-start");
        }
        let at_end = (line.end == buf.len() - 1 && buf[line.end] == b'\n')
            || (line.end + 2 == buf.len() && &buf[line.end..] == b"\r\n");
        if at_end {
            max = conf.int("max-end");
        }

        if blank_lines as i64 > max {
            return vec![Problem::new(
                line.line_no,
                1,
                format!("too many blank lines ({blank_lines} > {max})"),
            )];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{check_line_rule, positions};

    const DEFAULTS: &str = "rules:\n  empty-lines: enable\n";

    fn check(buffer: &str) -> Vec<Problem> {
        check_line_rule(&EmptyLines, DEFAULTS, buffer)
    }

    #[test]
    fn test_two_blank_lines_pass() {
        assert!(check("a: 1\n\n\nb: 2\n").is_empty());
    }

    #[test]
    fn test_three_blank_lines_report_on_the_last() {
        let problems = check("a: 1\n\n\n\nb: 2\n");
        assert_eq!(positions(&problems), [(4, 1)]);
        assert_eq!(problems[0].desc, "too many blank lines (3 > 2)");
    }

    #[test]
    fn test_blank_line_at_start() {
        let problems = check("\na: 1\n");
        assert_eq!(positions(&problems), [(1, 1)]);
        assert_eq!(problems[0].desc, "too many blank lines (1 > 0)");
    }

    #[test]
    fn test_blank_line_at_end() {
        let problems = check("a: 1\n\n");
        assert_eq!(positions(&problems), [(2, 1)]);
        assert_eq!(problems[0].desc, "too many blank lines (1 > 0)");
    }

    #[test]
    fn test_raised_limits() {
        let conf = "rules:\n  empty-lines:\n    max: 2\n    max-start: 1\n    max-end: 1\n";
        assert!(check_line_rule(&EmptyLines, conf, "\na: 1\n\n").is_empty());
    }

    #[test]
    fn test_dos_blank_lines() {
        let problems = check("a: 1\r\n\r\n\r\n\r\nb: 2\r\n");
        assert_eq!(positions(&problems), [(4, 1)]);
    }
}
