//! Control the number of spaces after hyphens in block sequences.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::rules::common::spaces_after;
use crate::stream::TokenView;
use yaml_rust2::scanner::TokenType;

pub struct Hyphens;

impl Rule for Hyphens {
    fn id(&self) -> &'static str {
        "hyphens"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::new("max-spaces-after", OptionType::Int, 1)]
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        if matches!(view.curr.kind, TokenType::BlockEntry) {
            return spaces_after(
                view,
                -1,
                conf.int("max-spaces-after"),
                "",
                "too many spaces after hyphen",
            )
            .into_iter()
            .collect();
        }
        Vec::new()
    }
}
