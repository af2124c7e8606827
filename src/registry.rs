//! Explicit rule registration table.
//!
//! Rule sets are plain values injected into the config resolver and the
//! linter, so tests can swap them; the stock table is built once and cached.

use crate::rule::Rule;
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
    by_id: HashMap<&'static str, usize>,
    duplicates: Vec<&'static str>,
}

impl Registry {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        let mut by_id = HashMap::with_capacity(rules.len());
        let mut duplicates = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if by_id.insert(rule.id(), index).is_some() {
                duplicates.push(rule.id());
            }
        }
        Self {
            rules,
            by_id,
            duplicates,
        }
    }

    /// The stock rule table, populated once and read-only thereafter.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| Registry::new(crate::rules::builtin_rules()))
    }

    /// Look up a rule by id. Unknown ids are `None`, never an error.
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.by_id.get(id).map(|&i| self.rules[i].as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.id())
    }

    /// Ids registered more than once. A collision is surfaced as a
    /// configuration error by the resolver, not here.
    pub fn duplicate_ids(&self) -> &[&'static str] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = Registry::builtin();
        assert!(registry.get("trailing-spaces").is_some());
        assert!(registry.get("colons").is_some());
        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn test_builtin_has_no_duplicates() {
        assert!(Registry::builtin().duplicate_ids().is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_recorded() {
        let registry = Registry::new(vec![
            Box::new(crate::rules::trailing_spaces::TrailingSpaces),
            Box::new(crate::rules::trailing_spaces::TrailingSpaces),
        ]);
        assert_eq!(registry.duplicate_ids(), &["trailing-spaces"]);
    }
}
