//! Control comment style: spacing from content and after the `#`.

use crate::linter::Problem;
use crate::rule::{OptionSpec, OptionType, Rule, RuleKind, RuleSettings};
use crate::stream::Comment;

pub struct Comments;

impl Rule for Comments {
    fn id(&self) -> &'static str {
        "comments"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Comment
    }

    fn schema(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("require-starting-space", OptionType::Bool, true),
            OptionSpec::new("ignore-shebangs", OptionType::Bool, true),
            OptionSpec::new("min-spaces-from-content", OptionType::Int, 2),
        ]
    }

    fn check_comment(&self, conf: &RuleSettings, comment: &Comment) -> Vec<Problem> {
        let mut problems = Vec::new();

        let min_spaces = conf.int("min-spaces-from-content");
        if min_spaces != -1
            && comment.is_inline()
            && let Some(before) = comment.token_before_end
            && (comment.pointer - before.index) < min_spaces as usize
        {
            problems.push(Problem::new(
                comment.line_no,
                comment.column_no,
                "too few spaces before comment",
            ));
        }

        if conf.bool("require-starting-space") {
            let text = comment.text();
            let hashes = text.bytes().take_while(|b| *b == b'#').count();
            let rest = &text[hashes..];
            let shebang = conf.bool("ignore-shebangs")
                && comment.line_no == 1
                && comment.column_no == 1
                && rest.starts_with('!')
                && rest[1..].chars().next().is_some_and(|c| !c.is_whitespace());
            if !rest.is_empty() && !rest.starts_with(' ') && !shebang {
                problems.push(Problem::new(
                    comment.line_no,
                    comment.column_no + hashes,
                    "missing starting space in comment",
                ));
            }
        }

        problems
    }
}
