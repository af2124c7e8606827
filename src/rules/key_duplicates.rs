//! Forbid duplicated keys within the same mapping.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleContext, RuleKind, RuleSettings};
use crate::stream::TokenView;
use yaml_rust2::scanner::TokenType;

pub struct KeyDuplicates;

/// One open collection on the nesting stack; keys are only tracked for
/// mappings.
struct Parent {
    is_map: bool,
    keys: Vec<String>,
}

impl Rule for KeyDuplicates {
    fn id(&self) -> &'static str {
        "key-duplicates"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Token
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::new(
            "forbid-duplicated-merge-keys",
            OptionType::Bool,
            false,
        )]
    }

    fn check_token(
        &self,
        conf: &RuleSettings,
        view: &TokenView<'_>,
        context: &mut RuleContext,
    ) -> Vec<Problem> {
        let stack = context.slot::<Vec<Parent>>("stack");
        match &view.curr.kind {
            TokenType::BlockMappingStart | TokenType::FlowMappingStart => stack.push(Parent {
                is_map: true,
                keys: Vec::new(),
            }),
            TokenType::BlockSequenceStart | TokenType::FlowSequenceStart => stack.push(Parent {
                is_map: false,
                keys: Vec::new(),
            }),
            TokenType::BlockEnd | TokenType::FlowMappingEnd | TokenType::FlowSequenceEnd => {
                stack.pop();
            }
            TokenType::Key => {
                // Key tokens also appear inside flow sequences; only count
                // them when the enclosing collection really is a mapping.
                if let Some(next) = view.next
                    && let TokenType::Scalar(_, value) = &next.kind
                    && let Some(parent) = stack.last_mut()
                    && parent.is_map
                {
                    let is_merge_key = value == "<<";
                    if parent.keys.iter().any(|k| k == value)
                        && (!is_merge_key || conf.bool("forbid-duplicated-merge-keys"))
                    {
                        return vec![Problem::new(
                            next.start.line,
                            next.start.column + 1,
                            format!("duplication of key \"{value}\" in mapping"),
                        )];
                    }
                    parent.keys.push(value.clone());
                }
            }
            _ => {}
        }
        Vec::new()
    }
}
