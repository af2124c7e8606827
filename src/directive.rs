//! In-document disable/enable directive comments.
//!
//! Three independent scopes track disabled rule ids: a document-wide set
//! toggled by `# yamllint disable` / `# yamllint enable`, a current-line set
//! fed by inline `# yamllint disable-line` comments, and a next-line set fed
//! by standalone `disable-line` comments. The sets only advance at two
//! transition points: when a comment is observed and when a line flushes.

use crate::stream::Comment;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static DISABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^# yamllint disable((?: rule:\S+)*)\s*$").expect("directive pattern")
});
static ENABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^# yamllint enable((?: rule:\S+)*)\s*$").expect("directive pattern")
});
static DISABLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^# yamllint disable-line((?: rule:\S+)*)\s*$").expect("directive pattern")
});

enum Directive {
    Disable(Vec<String>),
    Enable(Vec<String>),
    DisableLine(Vec<String>),
}

fn parse_directive(text: &str) -> Option<Directive> {
    // disable-line first: the plain disable pattern cannot match it, but the
    // order documents the precedence anyway.
    if let Some(caps) = DISABLE_LINE.captures(text) {
        return Some(Directive::DisableLine(rule_names(&caps[1])));
    }
    if let Some(caps) = DISABLE.captures(text) {
        return Some(Directive::Disable(rule_names(&caps[1])));
    }
    if let Some(caps) = ENABLE.captures(text) {
        return Some(Directive::Enable(rule_names(&caps[1])));
    }
    None
}

fn rule_names(list: &str) -> Vec<String> {
    list.split_whitespace()
        .filter_map(|item| item.strip_prefix("rule:"))
        .map(str::to_string)
        .collect()
}

/// Tracks which rules are currently suppressed by directives.
pub struct DirectiveEngine {
    /// The universe of known rule ids; unrecognized names in a directive are
    /// silently ignored.
    all_rules: BTreeSet<String>,
    document: BTreeSet<String>,
    current_line: BTreeSet<String>,
    next_line: BTreeSet<String>,
}

impl DirectiveEngine {
    pub fn new(all_rules: impl IntoIterator<Item = String>) -> Self {
        Self {
            all_rules: all_rules.into_iter().collect(),
            document: BTreeSet::new(),
            current_line: BTreeSet::new(),
            next_line: BTreeSet::new(),
        }
    }

    /// Apply a comment to the matching scope: standalone comments drive the
    /// document and next-line scopes, inline comments the current line.
    pub fn observe_comment(&mut self, comment: &Comment) {
        let Some(directive) = parse_directive(comment.text()) else {
            return;
        };
        if comment.is_inline() {
            if let Directive::DisableLine(rules) = directive {
                Self::disable(&mut self.current_line, &self.all_rules, rules);
            }
        } else {
            match directive {
                Directive::Disable(rules) => {
                    Self::disable(&mut self.document, &self.all_rules, rules);
                }
                Directive::Enable(rules) => {
                    if rules.is_empty() {
                        self.document.clear();
                    } else {
                        for rule in rules {
                            self.document.remove(&rule);
                        }
                    }
                }
                Directive::DisableLine(rules) => {
                    Self::disable(&mut self.next_line, &self.all_rules, rules);
                }
            }
        }
    }

    fn disable(set: &mut BTreeSet<String>, all: &BTreeSet<String>, rules: Vec<String>) {
        if rules.is_empty() {
            set.extend(all.iter().cloned());
        } else {
            for rule in rules {
                if all.contains(&rule) {
                    set.insert(rule);
                }
            }
        }
    }

    /// Whether a finding of the given rule is suppressed at the current line.
    pub fn is_suppressed(&self, rule: &str) -> bool {
        self.document.contains(rule) || self.current_line.contains(rule)
    }

    /// A line flushed: the next-line scope becomes the current-line scope and
    /// then resets to empty.
    pub fn flush_line(&mut self) {
        self.current_line = std::mem::take(&mut self.next_line);
    }
}
