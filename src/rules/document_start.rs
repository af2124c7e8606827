//! Require or forbid the `---` document start marker.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::stream::TokenView;
use yaml_rust2::scanner::TokenType;

pub struct DocumentStart;

impl Rule for DocumentStart {
    fn id(&self) -> &'static str {
        "document-start"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::new("present", OptionType::Bool, true)]
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        if conf.bool("present") {
            let at_document_boundary = matches!(
                view.prev.map(|p| &p.kind),
                Some(
                    TokenType::StreamStart(_)
                        | TokenType::DocumentEnd
                        | TokenType::VersionDirective(..)
                        | TokenType::TagDirective(..)
                )
            );
            let opens_content = !matches!(
                view.curr.kind,
                TokenType::DocumentStart
                    | TokenType::VersionDirective(..)
                    | TokenType::TagDirective(..)
                    | TokenType::StreamEnd
            );
            if at_document_boundary && opens_content {
                return vec![Problem::new(
                    view.curr.start.line,
                    1,
                    "missing document start \"---\"",
                )];
            }
        } else if matches!(view.curr.kind, TokenType::DocumentStart) {
            return vec![Problem::new(
                view.curr.start.line,
                view.curr.start.column + 1,
                "found forbidden document start \"---\"",
            )];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{check_token_rule, positions};

    const REQUIRED: &str = "rules:\n  document-start: enable\n";
    const FORBIDDEN: &str = "rules:\n  document-start:\n    present: false\n";

    #[test]
    fn test_marker_present_passes() {
        assert!(check_token_rule(&DocumentStart, REQUIRED, "---\nkey: value\n").is_empty());
    }

    #[test]
    fn test_missing_marker() {
        let problems = check_token_rule(&DocumentStart, REQUIRED, "key: value\n");
        assert_eq!(positions(&problems), [(1, 1)]);
        assert_eq!(problems[0].desc, "missing document start \"---\"");
    }

    #[test]
    fn test_forbidden_marker() {
        let problems = check_token_rule(&DocumentStart, FORBIDDEN, "---\nkey: value\n");
        assert_eq!(positions(&problems), [(1, 1)]);
        assert_eq!(problems[0].desc, "found forbidden document start \"---\"");
    }

    #[test]
    fn test_empty_stream_passes() {
        assert!(check_token_rule(&DocumentStart, REQUIRED, "").is_empty());
    }
}
