//! Lint configuration: parsing, `extends` resolution and rule-option
//! validation.
//!
//! A configuration is first read into a raw, unvalidated shape so that an
//! `extends` chain can be deep-merged value-by-value; only the fully merged
//! result is validated against each rule's option schema and frozen into a
//! [`LintConfig`].

use crate::linter::Severity;
use crate::registry::Registry;
use crate::rule::{Choice, OptionType, Rule, RuleSettings};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid {name} config: {message}")]
    InvalidExtended { name: String, message: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }

    fn extended(name: &str, inner: ConfigError) -> Self {
        let message = match inner {
            ConfigError::Invalid(m) => m,
            other => other.to_string(),
        };
        ConfigError::InvalidExtended {
            name: name.to_string(),
            message,
        }
    }
}

/// Configurations shipped with the crate, addressable by bare name in
/// `extends`.
const BUNDLED_PRESETS: &[(&str, &str)] = &[
    ("default", include_str!("../conf/default.yaml")),
    ("relaxed", include_str!("../conf/relaxed.yaml")),
];

const DEFAULT_YAML_FILES: &[&str] = &[r".*\.yaml$", r".*\.yml$"];

/// A resolved, validated lint configuration. Immutable for the lifetime of
/// every lint pass that references it.
#[derive(Debug)]
pub struct LintConfig {
    /// Rule id to settings; `None` marks a rule explicitly disabled in the
    /// source, which shadows any definition inherited through `extends`.
    rules: BTreeMap<String, Option<RuleSettings>>,
    yaml_files: Vec<Regex>,
    ignore: Vec<glob::Pattern>,
}

impl LintConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_yaml_str_with_registry(text, Registry::builtin())
    }

    pub fn from_yaml_str_with_registry(
        text: &str,
        registry: &Registry,
    ) -> Result<Self, ConfigError> {
        validate(parse_raw(text)?, registry)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_registry(path, Registry::builtin())
    }

    pub fn from_file_with_registry(
        path: impl AsRef<Path>,
        registry: &Registry,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str_with_registry(&text, registry)
    }

    /// Read a configuration from a caller-supplied stream. The reader is
    /// borrowed, never closed.
    pub fn from_reader(reader: &mut dyn Read) -> Result<Self, ConfigError> {
        Self::from_reader_with_registry(reader, Registry::builtin())
    }

    pub fn from_reader_with_registry(
        reader: &mut dyn Read,
        registry: &Registry,
    ) -> Result<Self, ConfigError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|source| ConfigError::Io {
            path: PathBuf::from("<stream>"),
            source,
        })?;
        Self::from_yaml_str_with_registry(&text, registry)
    }

    /// The settings of a rule, or `None` if the rule is absent or disabled.
    pub fn rule(&self, id: &str) -> Option<&RuleSettings> {
        self.rules.get(id).and_then(Option::as_ref)
    }

    /// All rule ids mentioned in the configuration, disabled ones included.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// The enabled rules applicable to `path`, resolved against `registry`.
    /// A rule whose own ignore patterns match the path is excluded.
    pub fn enabled_rules<'r>(
        &'r self,
        registry: &'r Registry,
        path: Option<&Path>,
    ) -> Vec<(&'r dyn Rule, &'r RuleSettings)> {
        self.rules
            .iter()
            .filter_map(|(id, settings)| {
                let settings = settings.as_ref()?;
                if let Some(path) = path
                    && settings.ignores(path)
                {
                    return None;
                }
                registry.get(id).map(|rule| (rule, settings))
            })
            .collect()
    }

    /// Whether the configuration's top-level ignore patterns exempt `path`
    /// from linting entirely.
    pub fn is_file_ignored(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.ignore
            .iter()
            .any(|p| p.matches(&text) || p.matches_path(path))
    }

    /// Whether `path` looks like a YAML file per the `yaml-files` patterns.
    pub fn is_yaml_file(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.yaml_files.iter().any(|p| p.is_match(&text))
    }
}

/// The merged-but-unvalidated shape of a configuration document.
struct RawConf {
    rules: Mapping,
    yaml_files: Option<Value>,
    ignore: Option<Value>,
}

fn parse_raw(text: &str) -> Result<RawConf, ConfigError> {
    let doc: Value =
        serde_yaml::from_str(text).map_err(|e| ConfigError::invalid(e.to_string()))?;
    let Value::Mapping(mut root) = doc else {
        return Err(ConfigError::invalid("not a dict"));
    };

    let extends = root.remove("extends");
    let yaml_files = root.remove("yaml-files");
    let ignore = root.remove("ignore");
    let rules = match root.remove("rules") {
        None | Some(Value::Null) => Mapping::new(),
        Some(Value::Mapping(m)) => m,
        Some(_) => return Err(ConfigError::invalid("rules should be a dict")),
    };

    let mut conf = RawConf {
        rules,
        yaml_files,
        ignore,
    };
    if let Some(target) = extends {
        let Value::String(name) = target else {
            return Err(ConfigError::invalid("extends should be a string"));
        };
        conf = merge_raw(load_extended(&name)?, conf);
    }
    Ok(conf)
}

/// Load the configuration an `extends` entry names: a filesystem path when
/// the name contains a path separator, a bundled preset otherwise. No cycle
/// detection is performed; a self-referential chain recurses unbounded.
fn load_extended(name: &str) -> Result<RawConf, ConfigError> {
    let text = if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        std::fs::read_to_string(name).map_err(|source| ConfigError::Io {
            path: PathBuf::from(name),
            source,
        })?
    } else {
        BUNDLED_PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, text)| (*text).to_string())
            .ok_or_else(|| {
                ConfigError::invalid(format!("no such config preset: \"{name}\""))
            })?
    };
    parse_raw(&text).map_err(|e| ConfigError::extended(name, e))
}

/// Merge an extended base under a child: rule maps merge deeply, the
/// non-rule settings are last-writer-wins along the chain.
fn merge_raw(base: RawConf, child: RawConf) -> RawConf {
    let mut rules = base.rules;
    for (key, value) in child.rules {
        let merged = match rules.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        rules.insert(key, merged);
    }
    RawConf {
        rules,
        yaml_files: child.yaml_files.or(base.yaml_files),
        ignore: child.ignore.or(base.ignore),
    }
}

/// Recursive merge of a child value over a base value. Maps merge key-wise,
/// lists merge as a set union that keeps the base order and appends items new
/// in the child; any other combination is replaced by the child outright.
fn deep_merge(base: Value, child: Value) -> Value {
    match (base, child) {
        (Value::Mapping(mut base), Value::Mapping(child)) => {
            for (key, value) in child {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (Value::Sequence(mut base), Value::Sequence(child)) => {
            for item in child {
                if !base.contains(&item) {
                    base.push(item);
                }
            }
            Value::Sequence(base)
        }
        (_, child) => child,
    }
}

fn validate(conf: RawConf, registry: &Registry) -> Result<LintConfig, ConfigError> {
    if let Some(dup) = registry.duplicate_ids().first() {
        return Err(ConfigError::invalid(format!("duplicate rule id: \"{dup}\"")));
    }

    let yaml_files = match conf.yaml_files {
        None => DEFAULT_YAML_FILES
            .iter()
            .map(|p| Regex::new(p).expect("default yaml-files pattern"))
            .collect(),
        Some(value) => yaml_file_patterns(&value)?,
    };

    let ignore = match conf.ignore {
        None => Vec::new(),
        Some(value) => ignore_patterns(&value)?,
    };

    let mut rules = BTreeMap::new();
    for (key, value) in conf.rules {
        let Value::String(id) = key else {
            return Err(ConfigError::invalid("rule names should be strings"));
        };
        let rule = registry
            .get(&id)
            .ok_or_else(|| ConfigError::invalid(format!("no such rule: \"{id}\"")))?;
        let settings = match value {
            Value::Null => None,
            Value::String(s) if s == "disable" => None,
            Value::String(s) if s == "enable" => Some(validate_rule(rule, Mapping::new())?),
            Value::Mapping(map) => Some(validate_rule(rule, map)?),
            _ => {
                return Err(ConfigError::invalid(format!(
                    "rule \"{id}\": should be either \"enable\", \"disable\" or a dict"
                )));
            }
        };
        rules.insert(id, settings);
    }

    Ok(LintConfig {
        rules,
        yaml_files,
        ignore,
    })
}

fn yaml_file_patterns(value: &Value) -> Result<Vec<Regex>, ConfigError> {
    let error = || ConfigError::invalid("yaml-files should be a list of file patterns");
    let Value::Sequence(items) = value else {
        return Err(error());
    };
    items
        .iter()
        .map(|item| {
            let text = item.as_str().ok_or_else(error)?;
            Regex::new(text).map_err(|_| error())
        })
        .collect()
}

/// Ignore patterns arrive either as a newline-delimited string or a list of
/// strings; blank entries are skipped.
fn ignore_patterns(value: &Value) -> Result<Vec<glob::Pattern>, ConfigError> {
    let error = || ConfigError::invalid("ignore should contain file patterns");
    let texts: Vec<&str> = match value {
        Value::String(s) => s.lines().map(str::trim).filter(|l| !l.is_empty()).collect(),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(error))
            .collect::<Result<_, _>>()?,
        _ => return Err(error()),
    };
    texts
        .into_iter()
        .map(|t| glob::Pattern::new(t).map_err(|_| error()))
        .collect()
}

/// Validate one rule's option map against its schema and freeze it into
/// settings: `ignore` and `level` are peeled off first, every remaining key
/// must match the schema, absent schema options get their defaults, and the
/// rule's own post-validation hook has the last word.
fn validate_rule(rule: &dyn Rule, conf: Mapping) -> Result<RuleSettings, ConfigError> {
    let mut conf = conf;
    let ignore = match conf.remove("ignore") {
        None => Vec::new(),
        Some(value) => ignore_patterns(&value)?,
    };
    let level_error =
        || ConfigError::invalid("level should be \"error\", \"warning\" or \"info\"");
    let level = match conf.remove("level") {
        None => Severity::Error,
        Some(Value::String(s)) => s.parse().map_err(|_| level_error())?,
        Some(_) => return Err(level_error()),
    };

    let schema = rule.schema();
    let mut options = BTreeMap::new();
    for (key, value) in conf {
        let Value::String(key) = key else {
            return Err(ConfigError::invalid(format!(
                "option names of rule \"{}\" should be strings",
                rule.id()
            )));
        };
        let Some(spec) = schema.iter().find(|s| s.name == key) else {
            return Err(ConfigError::invalid(format!(
                "unknown option \"{}\" for rule \"{}\"",
                key,
                rule.id()
            )));
        };
        if !spec.kind.matches(&value) {
            return Err(option_error(rule.id(), &key, &spec.kind));
        }
        options.insert(key, value);
    }
    for spec in &schema {
        options
            .entry(spec.name.to_string())
            .or_insert_with(|| spec.default.clone());
    }

    let settings = RuleSettings::new(level, ignore, options);
    if let Some(message) = rule.validate(&settings) {
        return Err(ConfigError::invalid(format!("{}: {}", rule.id(), message)));
    }
    Ok(settings)
}

fn option_error(rule_id: &str, key: &str, kind: &OptionType) -> ConfigError {
    let message = match kind {
        OptionType::Bool => format!("option \"{key}\" of \"{rule_id}\" should be bool"),
        OptionType::Int => format!("option \"{key}\" of \"{rule_id}\" should be int"),
        OptionType::Str => format!("option \"{key}\" of \"{rule_id}\" should be str"),
        OptionType::List => format!("option \"{key}\" of \"{rule_id}\" should be a list"),
        OptionType::Choice(choices) => {
            let rendered: Vec<String> = choices.iter().map(render_choice).collect();
            format!(
                "option \"{key}\" of \"{rule_id}\" should be in ({})",
                rendered.join(", ")
            )
        }
    };
    ConfigError::invalid(message)
}

fn render_choice(choice: &Choice) -> String {
    match choice {
        Choice::Kind(kind) => kind.name().to_string(),
        Choice::Value(Value::String(s)) => s.clone(),
        Choice::Value(Value::Bool(b)) => b.to_string(),
        Choice::Value(Value::Number(n)) => n.to_string(),
        Choice::Value(other) => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_rules_section() {
        let config = LintConfig::from_yaml_str("rules: {}\n").unwrap();
        assert_eq!(config.rule_ids().count(), 0);
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = LintConfig::from_yaml_str("- a\n- b\n").unwrap_err();
        assert_eq!(err.to_string(), "invalid config: not a dict");
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let err = LintConfig::from_yaml_str("rules:\n  does-not-exist: enable\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: no such rule: \"does-not-exist\""
        );
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err =
            LintConfig::from_yaml_str("rules:\n  colons:\n    max-spaces: 2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: unknown option \"max-spaces\" for rule \"colons\""
        );
    }

    #[test]
    fn test_wrong_option_type_is_rejected() {
        let err = LintConfig::from_yaml_str(
            "rules:\n  colons:\n    max-spaces-before: banana\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: option \"max-spaces-before\" of \"colons\" should be int"
        );
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err =
            LintConfig::from_yaml_str("rules:\n  colons:\n    level: fatal\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: level should be \"error\", \"warning\" or \"info\""
        );
    }

    #[test]
    fn test_invalid_rule_shape_is_rejected() {
        let err = LintConfig::from_yaml_str("rules:\n  colons: 3\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: rule \"colons\": should be either \"enable\", \"disable\" or a dict"
        );
    }

    #[test]
    fn test_enable_yields_schema_defaults() {
        let config = LintConfig::from_yaml_str("rules:\n  colons: enable\n").unwrap();
        let settings = config.rule("colons").unwrap();
        assert_eq!(settings.int("max-spaces-before"), 0);
        assert_eq!(settings.int("max-spaces-after"), 1);
        assert_eq!(settings.level(), Severity::Error);
    }

    #[test]
    fn test_disable_keeps_the_key_with_no_settings() {
        let config = LintConfig::from_yaml_str("rules:\n  colons: disable\n").unwrap();
        assert!(config.rule("colons").is_none());
        assert_eq!(config.rule_ids().collect::<Vec<_>>(), ["colons"]);
    }

    #[test]
    fn test_extends_default_preset() {
        let config = LintConfig::from_yaml_str("extends: default\n").unwrap();
        assert!(config.rule("trailing-spaces").is_some());
        assert!(config.rule("colons").is_some());
    }

    #[test]
    fn test_extends_overrides_one_option_and_keeps_the_rest() {
        let conf = "extends: default\nrules:\n  colons:\n    max-spaces-after: 4\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        let settings = config.rule("colons").unwrap();
        assert_eq!(settings.int("max-spaces-after"), 4);
        assert_eq!(settings.int("max-spaces-before"), 0);
    }

    #[test]
    fn test_extends_child_can_disable_a_base_rule() {
        let conf = "extends: default\nrules:\n  trailing-spaces: disable\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        assert!(config.rule("trailing-spaces").is_none());
        assert!(config.rule_ids().any(|id| id == "trailing-spaces"));
    }

    #[test]
    fn test_extends_unknown_preset() {
        let err = LintConfig::from_yaml_str("extends: nonsense\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: no such config preset: \"nonsense\""
        );
    }

    #[test]
    fn test_extends_filesystem_path() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.yaml");
        let mut f = std::fs::File::create(&base).unwrap();
        f.write_all(b"rules:\n  colons:\n    max-spaces-after: 2\n")
            .unwrap();
        let conf = format!("extends: {}\nrules:\n  trailing-spaces: enable\n", base.display());
        let config = LintConfig::from_yaml_str(&conf).unwrap();
        assert_eq!(config.rule("colons").unwrap().int("max-spaces-after"), 2);
        assert!(config.rule("trailing-spaces").is_some());
    }

    #[test]
    fn test_extends_error_carries_the_target_name() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("broken.yaml");
        std::fs::write(&base, "- not a mapping\n").unwrap();
        let conf = format!("extends: {}\n", base.display());
        let err = LintConfig::from_yaml_str(&conf).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("invalid {} config: not a dict", base.display())
        );
    }

    #[test]
    fn test_deep_merge_of_nested_maps() {
        let base = serde_yaml::from_str::<Value>("a:\n  x: 1\n  y: 2\n").unwrap();
        let child = serde_yaml::from_str::<Value>("a:\n  y: 3\n  z: 4\n").unwrap();
        let merged = deep_merge(base, child);
        let expected = serde_yaml::from_str::<Value>("a:\n  x: 1\n  y: 3\n  z: 4\n").unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_deep_merge_of_lists_is_a_union() {
        let base = serde_yaml::from_str::<Value>("[a, b]").unwrap();
        let child = serde_yaml::from_str::<Value>("[b, c]").unwrap();
        let merged = deep_merge(base, child);
        let expected = serde_yaml::from_str::<Value>("[a, b, c]").unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_ignore_from_newline_delimited_string() {
        let conf = "ignore: |\n  *.generated.yaml\n  vendor/**\nrules: {}\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        assert!(config.is_file_ignored(Path::new("schema.generated.yaml")));
        assert!(config.is_file_ignored(Path::new("vendor/lib/a.yaml")));
        assert!(!config.is_file_ignored(Path::new("src/a.yaml")));
    }

    #[test]
    fn test_ignore_rejects_non_pattern_values() {
        let err = LintConfig::from_yaml_str("ignore: 17\nrules: {}\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: ignore should contain file patterns"
        );
    }

    #[test]
    fn test_base_ignore_survives_when_child_defines_none() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.yaml");
        std::fs::write(&base, "ignore: |\n  *.tmp.yaml\nrules: {}\n").unwrap();
        let conf = format!("extends: {}\nrules: {{}}\n", base.display());
        let config = LintConfig::from_yaml_str(&conf).unwrap();
        assert!(config.is_file_ignored(Path::new("scratch.tmp.yaml")));
    }

    #[test]
    fn test_yaml_files_defaults() {
        let config = LintConfig::from_yaml_str("rules: {}\n").unwrap();
        assert!(config.is_yaml_file(Path::new("a.yaml")));
        assert!(config.is_yaml_file(Path::new("a.yml")));
        assert!(!config.is_yaml_file(Path::new("a.json")));
    }

    #[test]
    fn test_yaml_files_override() {
        let conf = "yaml-files:\n  - '.*\\.myext$'\nrules: {}\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        assert!(config.is_yaml_file(Path::new("a.myext")));
        assert!(!config.is_yaml_file(Path::new("a.yaml")));
    }

    #[test]
    fn test_per_rule_ignore_excludes_the_rule_for_that_path() {
        let conf = "rules:\n  colons:\n    ignore: |\n      generated/**\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        let registry = Registry::builtin();
        let with_path = config.enabled_rules(registry, Some(Path::new("generated/a.yaml")));
        assert!(with_path.is_empty());
        let without = config.enabled_rules(registry, Some(Path::new("src/a.yaml")));
        assert_eq!(without.len(), 1);
    }

    #[test]
    fn test_validation_of_a_fully_explicit_map_is_idempotent() {
        let implicit = LintConfig::from_yaml_str("rules:\n  colons: enable\n").unwrap();
        let explicit = LintConfig::from_yaml_str(
            "rules:\n  colons:\n    level: error\n    max-spaces-before: 0\n    max-spaces-after: 1\n",
        )
        .unwrap();
        assert_eq!(
            implicit.rule("colons").unwrap().options(),
            explicit.rule("colons").unwrap().options()
        );
        assert_eq!(
            implicit.rule("colons").unwrap().level(),
            explicit.rule("colons").unwrap().level()
        );
    }

    #[test]
    fn test_relaxed_preset_extends_default() {
        let config = LintConfig::from_yaml_str("extends: relaxed\n").unwrap();
        // relaxed keeps the default rule set but lowers severities.
        assert!(config.rule_ids().any(|id| id == "trailing-spaces"));
    }
}
