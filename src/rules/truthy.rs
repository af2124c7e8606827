//! Forbid non-canonical truthy scalars like `yes` or `On`.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::stream::TokenView;
use serde_yaml::Value;
use yaml_rust2::scanner::{TScalarStyle, TokenType};

/// Every plain scalar YAML 1.1 resolves to a boolean.
const TRUTHY: &[&str] = &[
    "YES", "Yes", "yes", "NO", "No", "no", "TRUE", "True", "true", "FALSE", "False", "false",
    "ON", "On", "on", "OFF", "Off", "off",
];

pub struct Truthy;

impl Rule for Truthy {
    fn id(&self) -> &'static str {
        "truthy"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new(
                "allowed-values",
                OptionType::List,
                Value::from(vec!["true", "false"]),
            ),
            OptionSpec::new("check-keys", OptionType::Bool, true),
        ]
    }

    fn validate(&self, conf: &RuleSettings) -> Option<String> {
        for value in conf.str_list("allowed-values") {
            if !TRUTHY.contains(&value) {
                return Some(format!("allowed-values contains non-truthy value \"{value}\""));
            }
        }
        None
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        // An explicit tag fixes the type; nothing to normalize.
        if matches!(view.prev.map(|p| &p.kind), Some(TokenType::Tag(..))) {
            return Vec::new();
        }
        let is_key = matches!(view.prev.map(|p| &p.kind), Some(TokenType::Key));
        if is_key && !conf.bool("check-keys") {
            return Vec::new();
        }
        if let TokenType::Scalar(style, value) = &view.curr.kind
            && *style == TScalarStyle::Plain
            && TRUTHY.contains(&value.as_str())
        {
            let mut allowed = conf.str_list("allowed-values");
            if !allowed.contains(&value.as_str()) {
                allowed.sort_unstable();
                return vec![Problem::new(
                    view.curr.start.line,
                    view.curr.start.column + 1,
                    format!("truthy value should be one of [{}]", allowed.join(", ")),
                )];
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{check_token_rule, positions};

    const DEFAULTS: &str = "rules:\n  truthy: enable\n";

    #[test]
    fn test_canonical_booleans_pass() {
        assert!(check_token_rule(&Truthy, DEFAULTS, "a: true\nb: false\n").is_empty());
    }

    #[test]
    fn test_yes_is_reported() {
        let problems = check_token_rule(&Truthy, DEFAULTS, "a: yes\n");
        assert_eq!(positions(&problems), [(1, 4)]);
        assert_eq!(
            problems[0].desc,
            "truthy value should be one of [false, true]"
        );
    }

    #[test]
    fn test_quoted_scalar_passes() {
        assert!(check_token_rule(&Truthy, DEFAULTS, "a: 'yes'\n").is_empty());
    }

    #[test]
    fn test_truthy_key_is_reported() {
        let problems = check_token_rule(&Truthy, DEFAULTS, "yes: 1\n");
        assert_eq!(positions(&problems), [(1, 1)]);
    }

    #[test]
    fn test_check_keys_can_be_disabled() {
        let conf = "rules:\n  truthy:\n    check-keys: false\n";
        assert!(check_token_rule(&Truthy, conf, "yes: 1\n").is_empty());
    }

    #[test]
    fn test_allowed_values_extend_the_set() {
        let conf = "rules:\n  truthy:\n    allowed-values: [\"yes\", \"no\"]\n";
        assert!(check_token_rule(&Truthy, conf, "a: yes\n").is_empty());
        let problems = check_token_rule(&Truthy, conf, "a: true\n");
        assert_eq!(positions(&problems), [(1, 4)]);
    }

    #[test]
    fn test_non_truthy_allowed_value_is_rejected() {
        let conf = "rules:\n  truthy:\n    allowed-values: [\"maybe\"]\n";
        let err = crate::config::LintConfig::from_yaml_str(conf).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: truthy: allowed-values contains non-truthy value \"maybe\""
        );
    }
}
