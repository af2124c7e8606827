//! Enforce a single newline convention for the whole file.

use crate::linter::Problem;
use crate::rule::{Choice, OptionSpec, OptionType, Rule, RuleKind, RuleSettings};
use crate::stream::Line;
use serde_yaml::Value;

pub struct NewLines;

impl Rule for NewLines {
    fn id(&self) -> &'static str {
        "new-lines"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Line
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::new(
            "type",
            OptionType::Choice(vec![
                Choice::Value(Value::from("unix")),
                Choice::Value(Value::from("dos")),
            ]),
            "unix",
        )]
    }

    fn check_line(&self, conf: &RuleSettings, line: &Line<'_>) -> Vec<Problem> {
        let (newline, shown): (&[u8], &str) = match conf.str("type") {
            Some("dos") => (b"\r\n", r"\r\n"),
            _ => (b"\n", r"\n"),
        };
        // The first line's terminator settles the convention for the file.
        if line.start == 0
            && line.buffer.len() > line.end
            && !line.buffer.as_bytes()[line.end..].starts_with(newline)
        {
            return vec![Problem::new(
                1,
                line.content().chars().count() + 1,
                format!("wrong new line character: expected {shown}"),
            )];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{check_line_rule, positions};

    const UNIX: &str = "rules:\n  new-lines: enable\n";
    const DOS: &str = "rules:\n  new-lines:\n    type: dos\n";

    #[test]
    fn test_unix_newlines_pass() {
        assert!(check_line_rule(&NewLines, UNIX, "a: 1\nb: 2\n").is_empty());
    }

    #[test]
    fn test_dos_newline_under_unix_convention() {
        let problems = check_line_rule(&NewLines, UNIX, "a: 1\r\nb: 2\r\n");
        assert_eq!(positions(&problems), [(1, 5)]);
        assert_eq!(problems[0].desc, r"wrong new line character: expected \n");
    }

    #[test]
    fn test_unix_newline_under_dos_convention() {
        let problems = check_line_rule(&NewLines, DOS, "a: 1\nb: 2\n");
        assert_eq!(positions(&problems), [(1, 5)]);
        assert_eq!(problems[0].desc, r"wrong new line character: expected \r\n");
    }

    #[test]
    fn test_dos_newlines_pass() {
        assert!(check_line_rule(&NewLines, DOS, "a: 1\r\nb: 2\r\n").is_empty());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let conf = "rules:\n  new-lines:\n    type: mac\n";
        let err = crate::config::LintConfig::from_yaml_str(conf).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: option \"type\" of \"new-lines\" should be in (unix, dos)"
        );
    }
}
