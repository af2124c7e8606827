use crate::config::LintConfig;
use crate::linter::{Linter, Problem, Severity};
use crate::reporter::{OutputFormat, Reporter};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use walkdir::WalkDir;

/// Config files looked up in the working directory when none is given.
const DISCOVERY_NAMES: &[&str] = &[".yamllint", ".yamllint.yaml", ".yamllint.yml"];

#[derive(Parser)]
#[command(name = "yamllint")]
#[command(author, version, about = "A linter for YAML files", long_about = None)]
pub struct Cli {
    /// Files or directories to lint
    #[arg(value_name = "FILE_OR_DIR", required = true)]
    pub files: Vec<PathBuf>,

    /// Path to a configuration file
    #[arg(short = 'c', long, value_name = "FILE", conflicts_with = "config_data")]
    pub config_file: Option<PathBuf>,

    /// Inline configuration, as YAML or a bare preset name
    #[arg(short = 'd', long, value_name = "YAML")]
    pub config_data: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "standard")]
    pub format: Format,

    /// Also fail (exit code 2) when warnings are found
    #[arg(short, long)]
    pub strict: bool,

    /// Report only error-level problems
    #[arg(long)]
    pub no_warnings: bool,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List the files that would be linted, without linting them
    #[arg(long)]
    pub list_files: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Format {
    Standard,
    Parsable,
    Github,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Standard => OutputFormat::Standard,
            Format::Parsable => OutputFormat::Parsable,
            Format::Github => OutputFormat::Github,
            Format::Json => OutputFormat::Json,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    if cli.color {
        colored::control::set_override(true);
    } else if cli.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let files = collect_files(&cli.files, &config);
    if cli.list_files {
        for file in &files {
            println!("{}", file.display());
        }
        return ExitCode::SUCCESS;
    }

    let use_color = matches!(cli.format, Format::Standard);
    let reporter = Reporter::with_color(cli.format.into(), use_color);

    let mut results: Vec<(PathBuf, Vec<Problem>)> = files
        .par_iter()
        .filter_map(|path| {
            let linter = Linter::new(&config);
            match std::fs::read_to_string(path) {
                Ok(buffer) => Some((path.clone(), linter.run_path(&buffer, Some(path)))),
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    None
                }
            }
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut max_level = None;
    for (path, mut problems) in results {
        if cli.no_warnings {
            problems.retain(|p| p.level == Some(Severity::Error));
        }
        max_level = max_level.max(problems.iter().filter_map(|p| p.level).max());
        reporter.report(&path, &problems);
    }

    match max_level {
        Some(Severity::Error) => ExitCode::from(1),
        Some(Severity::Warning) if cli.strict => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    }
}

fn load_config(cli: &Cli) -> Result<LintConfig, crate::config::ConfigError> {
    if let Some(path) = &cli.config_file {
        return LintConfig::from_file(path);
    }
    if let Some(data) = &cli.config_data {
        // A bare word is shorthand for extending a preset.
        let source = if data.contains(':') || data.contains('\n') {
            data.clone()
        } else {
            format!("extends: {data}")
        };
        return LintConfig::from_yaml_str(&source);
    }
    for name in DISCOVERY_NAMES {
        let path = PathBuf::from(name);
        if path.is_file() {
            return LintConfig::from_file(&path);
        }
    }
    LintConfig::from_yaml_str("extends: default")
}

/// Expand directories into the YAML files they contain; explicitly named
/// files are kept regardless of the `yaml-files` patterns.
fn collect_files(inputs: &[PathBuf], config: &LintConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    let path = entry.into_path();
                    if config.is_yaml_file(&path) && !config.is_file_ignored(&path) {
                        files.push(path);
                    }
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), "a: 1\n").unwrap();
        fs::write(dir.path().join("b.yml"), "b: 2\n").unwrap();
        fs::write(dir.path().join("c.txt"), "not yaml\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.yaml"), "d: 4\n").unwrap();

        let config = LintConfig::from_yaml_str("extends: default").unwrap();
        let files = collect_files(&[dir.path().to_path_buf()], &config);
        let names: Vec<String> = files
            .iter()
            .map(|f| {
                f.strip_prefix(dir.path())
                    .unwrap()
                    .display()
                    .to_string()
            })
            .collect();
        assert_eq!(names, ["a.yaml", "b.yml", "sub/d.yaml"]);
    }

    #[test]
    fn test_collect_files_keeps_explicit_non_yaml_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.txt");
        fs::write(&file, "a: 1\n").unwrap();

        let config = LintConfig::from_yaml_str("extends: default").unwrap();
        let files = collect_files(&[file.clone()], &config);
        assert_eq!(files, [file]);
    }

    #[test]
    fn test_collect_files_applies_config_ignores() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.yaml"), "a: 1\n").unwrap();
        fs::write(dir.path().join("skip.generated.yaml"), "a: 1\n").unwrap();

        let conf = "extends: default\nignore: |\n  *.generated.yaml\n";
        let config = LintConfig::from_yaml_str(conf).unwrap();
        let files = collect_files(&[dir.path().to_path_buf()], &config);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.yaml"));
    }
}
