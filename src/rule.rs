//! The rule contract: stateless rule descriptors, their option schemas, and
//! the per-configuration settings record passed into every check.

use crate::linter::{Problem, Severity};
use crate::stream::{Comment, Line, TokenView};
use serde_yaml::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Which stream elements a rule consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Token,
    Line,
    Comment,
}

/// Scalar shapes an option value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Str,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Str => "str",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ScalarKind::Bool => value.is_bool(),
            ScalarKind::Int => value.as_i64().is_some(),
            ScalarKind::Str => value.is_string(),
        }
    }
}

/// One admissible alternative of a fixed-choice option: either an exact
/// value, or any value of a scalar kind.
#[derive(Debug, Clone)]
pub enum Choice {
    Value(Value),
    Kind(ScalarKind),
}

/// The declared shape of one option value.
#[derive(Debug, Clone)]
pub enum OptionType {
    Bool,
    Int,
    Str,
    List,
    Choice(Vec<Choice>),
}

impl OptionType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            OptionType::Bool => ScalarKind::Bool.matches(value),
            OptionType::Int => ScalarKind::Int.matches(value),
            OptionType::Str => ScalarKind::Str.matches(value),
            OptionType::List => value.is_sequence(),
            OptionType::Choice(choices) => choices.iter().any(|c| match c {
                Choice::Value(v) => v == value,
                Choice::Kind(kind) => kind.matches(value),
            }),
        }
    }
}

/// One entry of a rule's option schema.
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionType,
    pub default: Value,
}

impl OptionSpec {
    pub fn new(name: &'static str, kind: OptionType, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind,
            default: default.into(),
        }
    }
}

/// Per-rule, per-lint-pass scratch state. Created fresh for every pass and
/// discarded afterwards; lets a token rule accumulate state across tokens.
#[derive(Default)]
pub struct RuleContext {
    slots: HashMap<&'static str, Box<dyn Any>>,
}

impl RuleContext {
    /// Fetch (creating on first use) a typed slot. A slot key is owned by a
    /// single rule and must always be used with the same type.
    pub fn slot<T: Any + Default>(&mut self, key: &'static str) -> &mut T {
        self.slots
            .entry(key)
            .or_insert_with(|| Box::<T>::default())
            .downcast_mut::<T>()
            .expect("rule context slot reused with a different type")
    }
}

/// The immutable per-configuration record for one enabled rule: severity,
/// compiled ignore patterns and the fully-defaulted option map. Owned by the
/// `LintConfig`, shared read-only by every lint pass that uses it.
#[derive(Debug, Clone)]
pub struct RuleSettings {
    level: Severity,
    ignore: Vec<glob::Pattern>,
    options: BTreeMap<String, Value>,
}

impl RuleSettings {
    pub(crate) fn new(
        level: Severity,
        ignore: Vec<glob::Pattern>,
        options: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            level,
            ignore,
            options,
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    /// Whether the given file path is exempt from this rule.
    pub fn ignores(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.ignore
            .iter()
            .any(|p| p.matches(&text) || p.matches_path(path))
    }

    /// The normalized option map; after validation every schema option is
    /// present, so the typed accessors below never miss for declared options.
    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn int(&self, key: &str) -> i64 {
        self.options.get(key).and_then(Value::as_i64).unwrap_or(-1)
    }

    pub fn bool(&self, key: &str) -> bool {
        self.options
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn str_list(&self, key: &str) -> Vec<&str> {
        self.options
            .get(key)
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// A lint rule: a stateless descriptor identified by a stable string id.
///
/// A rule is polymorphic over exactly one capability, selected by `kind()`;
/// the two non-matching check methods keep their empty default. All
/// per-configuration state arrives through `RuleSettings`, all per-pass
/// state through `RuleContext`.
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;

    fn kind(&self) -> RuleKind;

    fn schema(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    /// Cross-option consistency hook, run after all options are bound.
    /// A returned message rejects the configuration.
    fn validate(&self, _conf: &RuleSettings) -> Option<String> {
        None
    }

    fn check_token(
        &self,
        _conf: &RuleSettings,
        _token: &TokenView<'_>,
        _context: &mut RuleContext,
    ) -> Vec<Problem> {
        Vec::new()
    }

    fn check_line(&self, _conf: &RuleSettings, _line: &Line<'_>) -> Vec<Problem> {
        Vec::new()
    }

    fn check_comment(&self, _conf: &RuleSettings, _comment: &Comment) -> Vec<Problem> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind_matching_is_exact() {
        assert!(ScalarKind::Bool.matches(&Value::from(true)));
        assert!(!ScalarKind::Int.matches(&Value::from(true)));
        assert!(ScalarKind::Int.matches(&Value::from(3)));
        assert!(!ScalarKind::Int.matches(&Value::from(3.5)));
        assert!(ScalarKind::Str.matches(&Value::from("x")));
        assert!(!ScalarKind::Str.matches(&Value::from(3)));
    }

    #[test]
    fn test_choice_accepts_values_and_kinds() {
        let choice = OptionType::Choice(vec![
            Choice::Kind(ScalarKind::Bool),
            Choice::Value(Value::from("non-empty")),
        ]);
        assert!(choice.matches(&Value::from(false)));
        assert!(choice.matches(&Value::from("non-empty")));
        assert!(!choice.matches(&Value::from("something-else")));
        assert!(!choice.matches(&Value::from(0)));
    }

    #[test]
    fn test_context_slot_round_trip() {
        let mut context = RuleContext::default();
        context.slot::<Vec<u32>>("stack").push(7);
        context.slot::<Vec<u32>>("stack").push(8);
        assert_eq!(context.slot::<Vec<u32>>("stack"), &vec![7, 8]);
    }

    #[test]
    fn test_settings_ignores_paths_by_glob() {
        let settings = RuleSettings::new(
            Severity::Error,
            vec![glob::Pattern::new("vendor/**/*.yaml").unwrap()],
            BTreeMap::new(),
        );
        assert!(settings.ignores(Path::new("vendor/a/b.yaml")));
        assert!(!settings.ignores(Path::new("src/b.yaml")));
    }
}
