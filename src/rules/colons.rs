//! Control the number of spaces around colons in mappings.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::rules::common::{is_explicit_key, spaces_after, spaces_before};
use crate::stream::TokenView;
use yaml_rust2::scanner::TokenType;

pub struct Colons;

impl Rule for Colons {
    fn id(&self) -> &'static str {
        "colons"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("max-spaces-before", OptionType::Int, 0),
            OptionSpec::new("max-spaces-after", OptionType::Int, 1),
        ]
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        let mut problems = Vec::new();
        match view.curr.kind {
            TokenType::Value => {
                // An alias must keep exactly one space before the colon; that
                // space is the alias separator, not style.
                let after_alias = view.prev.is_some_and(|p| {
                    matches!(p.kind, TokenType::Alias(_))
                        && view.curr.start.index - p.end.index == 1
                });
                if !after_alias {
                    problems.extend(spaces_before(
                        view,
                        -1,
                        conf.int("max-spaces-before"),
                        "",
                        "too many spaces before colon",
                    ));
                    problems.extend(spaces_after(
                        view,
                        -1,
                        conf.int("max-spaces-after"),
                        "",
                        "too many spaces after colon",
                    ));
                }
            }
            TokenType::Key if is_explicit_key(view) => {
                problems.extend(spaces_after(
                    view,
                    -1,
                    conf.int("max-spaces-after"),
                    "",
                    "too many spaces after question mark",
                ));
            }
            _ => {}
        }
        problems
    }
}
