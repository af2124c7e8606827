pub mod config;
pub mod directive;
pub mod linter;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod reporter;

pub use config::{ConfigError, LintConfig};
pub use linter::{Linter, Problem, Severity};
pub use registry::Registry;
pub use rule::{Rule, RuleContext, RuleKind, RuleSettings};

#[cfg(feature = "cli")]
pub use reporter::{OutputFormat, Reporter};
