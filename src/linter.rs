use crate::config::LintConfig;
use crate::directive::DirectiveEngine;
use crate::registry::Registry;
use crate::rule::{Rule, RuleContext, RuleKind, RuleSettings};
use crate::stream::{StreamElement, TokenStream};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use yaml_rust2::YamlLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(()),
        }
    }
}

/// A single reported finding.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Short human-readable description.
    pub desc: String,
    /// Id of the rule that produced the finding; `None` for syntax errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Configured severity; filled in by the orchestrator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,
    /// Optional multi-line extra description for renderers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl Problem {
    pub fn new(line: usize, column: usize, desc: impl Into<String>) -> Self {
        Self {
            line,
            column,
            desc: desc.into(),
            rule: None,
            level: None,
            extra: None,
        }
    }

    fn syntax(line: usize, column: usize, desc: String) -> Self {
        Self {
            line,
            column,
            desc,
            rule: None,
            level: Some(Severity::Error),
            extra: None,
        }
    }

    /// Identity for deduplication: two problems at the same position from the
    /// same rule are the same problem.
    fn key(&self) -> (usize, usize, Option<&str>) {
        (self.line, self.column, self.rule.as_deref())
    }

    /// Ordering: ascending position; at the same position a syntax error
    /// (no rule id) outranks any cosmetic problem.
    fn sort_key(&self) -> (usize, usize, bool, &str, &str) {
        (
            self.line,
            self.column,
            self.rule.is_some(),
            self.rule.as_deref().unwrap_or(""),
            &self.desc,
        )
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule {
            Some(rule) => write!(f, "{}:{}: {} ({})", self.line, self.column, self.desc, rule),
            None => write!(f, "{}:{}: {}", self.line, self.column, self.desc),
        }
    }
}

/// Runs the composed element stream of a document through the enabled rules
/// of a configuration and produces the sorted, deduplicated problem list.
pub struct Linter<'a> {
    config: &'a LintConfig,
    registry: &'a Registry,
}

impl<'a> Linter<'a> {
    pub fn new(config: &'a LintConfig) -> Self {
        Self {
            config,
            registry: Registry::builtin(),
        }
    }

    pub fn with_registry(config: &'a LintConfig, registry: &'a Registry) -> Self {
        Self { config, registry }
    }

    /// Lint a document with no associated file path.
    pub fn run(&self, buffer: &str) -> Vec<Problem> {
        self.run_path(buffer, None)
    }

    /// Lint a document, applying config-level and per-rule path ignores.
    pub fn run_path(&self, buffer: &str, path: Option<&Path>) -> Vec<Problem> {
        if let Some(path) = path
            && self.config.is_file_ignored(path)
        {
            return Vec::new();
        }

        let mut problems = self.run_checks(buffer, path);
        if let Some(syntax) = syntax_problem(buffer) {
            // A cosmetic problem at the exact position of the syntax error is
            // redundant noise.
            problems.retain(|p| !(p.line == syntax.line && p.column == syntax.column));
            problems.push(syntax);
        }

        problems.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        problems.dedup_by(|a, b| a.key() == b.key());
        problems
    }

    /// Lint a document read from a caller-supplied stream. The reader is
    /// borrowed, never closed.
    pub fn run_reader(
        &self,
        reader: &mut dyn Read,
        path: Option<&Path>,
    ) -> std::io::Result<Vec<Problem>> {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        Ok(self.run_path(&buffer, path))
    }

    fn run_checks(&self, buffer: &str, path: Option<&Path>) -> Vec<Problem> {
        let enabled = self.config.enabled_rules(self.registry, path);
        let mut token_rules: Vec<(&dyn Rule, &RuleSettings)> = Vec::new();
        let mut line_rules: Vec<(&dyn Rule, &RuleSettings)> = Vec::new();
        let mut comment_rules: Vec<(&dyn Rule, &RuleSettings)> = Vec::new();
        for (rule, settings) in enabled {
            match rule.kind() {
                RuleKind::Token => token_rules.push((rule, settings)),
                RuleKind::Line => line_rules.push((rule, settings)),
                RuleKind::Comment => comment_rules.push((rule, settings)),
            }
        }

        // Per-rule scratch state, rebuilt fresh for every lint pass.
        let mut contexts: HashMap<&'static str, RuleContext> = HashMap::new();

        let mut engine = DirectiveEngine::new(self.registry.ids().map(str::to_string));
        let mut cache: Vec<Problem> = Vec::new();
        let mut problems: Vec<Problem> = Vec::new();

        let stream = TokenStream::scan(buffer);
        for elem in stream.elements() {
            match elem {
                StreamElement::Token(view) => {
                    for (rule, settings) in &token_rules {
                        let context = contexts.entry(rule.id()).or_default();
                        for problem in rule.check_token(settings, &view, context) {
                            cache.push(tag(problem, rule.id(), settings));
                        }
                    }
                }
                StreamElement::Comment(comment) => {
                    for (rule, settings) in &comment_rules {
                        for problem in rule.check_comment(settings, comment) {
                            cache.push(tag(problem, rule.id(), settings));
                        }
                    }
                    engine.observe_comment(comment);
                }
                StreamElement::Line(line) => {
                    for (rule, settings) in &line_rules {
                        for problem in rule.check_line(settings, &line) {
                            cache.push(tag(problem, rule.id(), settings));
                        }
                    }
                    // The line is the flush point: suppressed findings are
                    // dropped, survivors emitted, and the next-line directive
                    // scope rolls forward.
                    for problem in cache.drain(..) {
                        let suppressed = problem
                            .rule
                            .as_deref()
                            .is_some_and(|rule| engine.is_suppressed(rule));
                        if !suppressed {
                            problems.push(problem);
                        }
                    }
                    engine.flush_line();
                }
            }
        }
        problems
    }
}

fn tag(mut problem: Problem, rule_id: &'static str, settings: &RuleSettings) -> Problem {
    problem.rule = Some(rule_id.to_string());
    problem.level = Some(settings.level());
    problem
}

/// Full syntax parse of the source; a lexical/grammar failure becomes a
/// rule-less, error-level problem at the failure's reported position.
fn syntax_problem(buffer: &str) -> Option<Problem> {
    match YamlLoader::load_from_str(buffer) {
        Ok(_) => None,
        Err(e) => {
            let marker = *e.marker();
            Some(Problem::syntax(
                marker.line(),
                marker.col() + 1,
                format!("syntax error: {}", e.info()),
            ))
        }
    }
}
