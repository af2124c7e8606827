//! The built-in rule catalog.

use crate::rule::Rule;

mod common;

pub mod brackets;
pub mod colons;
pub mod commas;
pub mod comments;
pub mod document_start;
pub mod empty_lines;
pub mod hyphens;
pub mod key_duplicates;
pub mod new_line_at_end_of_file;
pub mod new_lines;
pub mod trailing_spaces;
pub mod truthy;

/// One instance of every built-in rule.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(brackets::Brackets),
        Box::new(colons::Colons),
        Box::new(commas::Commas),
        Box::new(comments::Comments),
        Box::new(document_start::DocumentStart),
        Box::new(empty_lines::EmptyLines),
        Box::new(hyphens::Hyphens),
        Box::new(key_duplicates::KeyDuplicates),
        Box::new(new_line_at_end_of_file::NewLineAtEndOfFile),
        Box::new(new_lines::NewLines),
        Box::new(trailing_spaces::TrailingSpaces),
        Box::new(truthy::Truthy),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::LintConfig;
    use crate::linter::Problem;
    use crate::rule::{Rule, RuleContext, RuleSettings};
    use crate::stream::{StreamElement, TokenStream, lines};

    pub(crate) fn settings(conf: &str, rule_id: &str) -> RuleSettings {
        LintConfig::from_yaml_str(conf)
            .unwrap()
            .rule(rule_id)
            .unwrap()
            .clone()
    }

    /// Run a single token rule over a whole document.
    pub(crate) fn check_token_rule(rule: &dyn Rule, conf: &str, buffer: &str) -> Vec<Problem> {
        let settings = settings(conf, rule.id());
        let stream = TokenStream::scan(buffer);
        let mut context = RuleContext::default();
        let mut problems = Vec::new();
        for elem in stream.elements() {
            if let StreamElement::Token(view) = elem {
                problems.extend(rule.check_token(&settings, &view, &mut context));
            }
        }
        problems
    }

    pub(crate) fn check_line_rule(rule: &dyn Rule, conf: &str, buffer: &str) -> Vec<Problem> {
        let settings = settings(conf, rule.id());
        lines(buffer)
            .flat_map(|line| rule.check_line(&settings, &line))
            .collect()
    }

    pub(crate) fn check_comment_rule(rule: &dyn Rule, conf: &str, buffer: &str) -> Vec<Problem> {
        let settings = settings(conf, rule.id());
        let stream = TokenStream::scan(buffer);
        stream
            .comments()
            .iter()
            .flat_map(|comment| rule.check_comment(&settings, comment))
            .collect()
    }

    pub(crate) fn positions(problems: &[Problem]) -> Vec<(usize, usize)> {
        problems.iter().map(|p| (p.line, p.column)).collect()
    }
}
