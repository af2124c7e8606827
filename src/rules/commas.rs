//! Control the number of spaces around commas in flow collections.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::rules::common::{spaces_after, spaces_before};
use crate::stream::TokenView;
use yaml_rust2::scanner::TokenType;

pub struct Commas;

impl Rule for Commas {
    fn id(&self) -> &'static str {
        "commas"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("max-spaces-before", OptionType::Int, 0),
            OptionSpec::new("min-spaces-after", OptionType::Int, 1),
            OptionSpec::new("max-spaces-after", OptionType::Int, 1),
        ]
    }

    fn validate(&self, conf: &RuleSettings) -> Option<String> {
        let min = conf.int("min-spaces-after");
        let max = conf.int("max-spaces-after");
        if max != -1 && min > max {
            return Some("max-spaces-after cannot be lower than min-spaces-after".to_string());
        }
        None
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        if !matches!(view.curr.kind, TokenType::FlowEntry) {
            return Vec::new();
        }
        let mut problems = Vec::new();
        let comma_on_new_line = view
            .prev
            .is_some_and(|p| p.end.line < view.curr.start.line);
        if comma_on_new_line && conf.int("max-spaces-before") != -1 {
            problems.push(Problem::new(
                view.curr.start.line,
                std::cmp::max(1, view.curr.start.column),
                "too many spaces before comma",
            ));
        } else {
            problems.extend(spaces_before(
                view,
                -1,
                conf.int("max-spaces-before"),
                "",
                "too many spaces before comma",
            ));
        }
        problems.extend(spaces_after(
            view,
            conf.int("min-spaces-after"),
            conf.int("max-spaces-after"),
            "too few spaces after comma",
            "too many spaces after comma",
        ));
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{check_token_rule, positions};

    const DEFAULTS: &str = "rules:\n  commas: enable\n";

    #[test]
    fn test_defaults_accept_one_space_after() {
        assert!(check_token_rule(&Commas, DEFAULTS, "list: [1, 2, 3]\n").is_empty());
    }

    #[test]
    fn test_space_before_comma() {
        let problems = check_token_rule(&Commas, DEFAULTS, "list: [1 , 2]\n");
        assert_eq!(positions(&problems), [(1, 9)]);
        assert_eq!(problems[0].desc, "too many spaces before comma");
    }

    #[test]
    fn test_missing_space_after_comma() {
        let problems = check_token_rule(&Commas, DEFAULTS, "list: [1,2]\n");
        assert_eq!(positions(&problems), [(1, 10)]);
        assert_eq!(problems[0].desc, "too few spaces after comma");
    }

    #[test]
    fn test_too_many_spaces_after_comma() {
        let problems = check_token_rule(&Commas, DEFAULTS, "list: [1,   2]\n");
        assert_eq!(positions(&problems), [(1, 12)]);
        assert_eq!(problems[0].desc, "too many spaces after comma");
    }

    #[test]
    fn test_comma_starting_a_line() {
        let problems = check_token_rule(&Commas, DEFAULTS, "list: [1\n  , 2]\n");
        assert_eq!(positions(&problems), [(2, 2)]);
        assert_eq!(problems[0].desc, "too many spaces before comma");
    }

    #[test]
    fn test_inconsistent_bounds_are_rejected() {
        let conf = "rules:\n  commas:\n    min-spaces-after: 3\n    max-spaces-after: 1\n";
        let err = crate::config::LintConfig::from_yaml_str(conf).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: commas: max-spaces-after cannot be lower than min-spaces-after"
        );
    }
}
