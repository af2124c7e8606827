//! Control the use of flow sequences and the spaces inside brackets.

use crate::linter::Problem;
use crate::rule::{
    Choice, OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings, ScalarKind,
};
use crate::rules::common::{spaces_after, spaces_before};
use crate::stream::TokenView;
use serde_yaml::Value;
use yaml_rust2::scanner::TokenType;

pub struct Brackets;

impl Rule for Brackets {
    fn id(&self) -> &'static str {
        "brackets"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new(
                "forbid",
                OptionType::Choice(vec![
                    Choice::Kind(ScalarKind::Bool),
                    Choice::Value(Value::from("non-empty")),
                ]),
                false,
            ),
            OptionSpec::new("min-spaces-inside", OptionType::Int, 0),
            OptionSpec::new("max-spaces-inside", OptionType::Int, 0),
            OptionSpec::new("min-spaces-inside-empty", OptionType::Int, -1),
            OptionSpec::new("max-spaces-inside-empty", OptionType::Int, -1),
        ]
    }

    fn validate(&self, conf: &RuleSettings) -> Option<String> {
        let min = conf.int("min-spaces-inside");
        let max = conf.int("max-spaces-inside");
        if max != -1 && min > max {
            return Some("max-spaces-inside cannot be lower than min-spaces-inside".to_string());
        }
        None
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        let forbid_all = conf.bool("forbid");
        let forbid_non_empty = conf.str("forbid") == Some("non-empty");
        let next_is_end = matches!(view.next.map(|n| &n.kind), Some(TokenType::FlowSequenceEnd));

        match view.curr.kind {
            TokenType::FlowSequenceStart if forbid_all || (forbid_non_empty && !next_is_end) => {
                vec![Problem::new(
                    view.curr.start.line,
                    view.curr.end.column + 1,
                    "forbidden flow sequence",
                )]
            }
            TokenType::FlowSequenceStart if next_is_end => {
                let pick = |empty: i64, plain: i64| if empty != -1 { empty } else { plain };
                spaces_after(
                    view,
                    pick(conf.int("min-spaces-inside-empty"), conf.int("min-spaces-inside")),
                    pick(conf.int("max-spaces-inside-empty"), conf.int("max-spaces-inside")),
                    "too few spaces inside empty brackets",
                    "too many spaces inside empty brackets",
                )
                .into_iter()
                .collect()
            }
            TokenType::FlowSequenceStart => spaces_after(
                view,
                conf.int("min-spaces-inside"),
                conf.int("max-spaces-inside"),
                "too few spaces inside brackets",
                "too many spaces inside brackets",
            )
            .into_iter()
            .collect(),
            TokenType::FlowSequenceEnd
                if !matches!(
                    view.prev.map(|p| &p.kind),
                    Some(TokenType::FlowSequenceStart)
                ) =>
            {
                spaces_before(
                    view,
                    conf.int("min-spaces-inside"),
                    conf.int("max-spaces-inside"),
                    "too few spaces inside brackets",
                    "too many spaces inside brackets",
                )
                .into_iter()
                .collect()
            }
            _ => Vec::new(),
        }
    }
}
