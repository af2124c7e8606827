use crate::linter::{Problem, Severity};
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Standard,
    Parsable,
    Github,
    Json,
}

pub struct Reporter {
    format: OutputFormat,
    color: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: false,
        }
    }

    pub fn with_color(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn report(&self, path: &Path, problems: &[Problem]) {
        let rendered = self.render(path, problems);
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }

    /// Render one file's problems in the configured format. Empty problem
    /// lists render to an empty string except in JSON, which always emits a
    /// report object.
    pub fn render(&self, path: &Path, problems: &[Problem]) -> String {
        match self.format {
            OutputFormat::Standard => self.render_standard(path, problems),
            OutputFormat::Parsable => render_parsable(path, problems),
            OutputFormat::Github => render_github(path, problems),
            OutputFormat::Json => render_json(path, problems),
        }
    }

    fn render_standard(&self, path: &Path, problems: &[Problem]) -> String {
        if problems.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        let filename = path.display().to_string();
        if self.color {
            out.push_str(&filename.underline().to_string());
        } else {
            out.push_str(&filename);
        }
        out.push('\n');
        for problem in problems {
            out.push_str(&self.standard_row(problem));
            out.push('\n');
        }
        out.pop();
        out
    }

    fn standard_row(&self, problem: &Problem) -> String {
        let position = format!("  {}:{}", problem.line, problem.column);
        let level = problem.level.unwrap_or(Severity::Error);
        let level_text = level.to_string();
        let shown_level = if self.color {
            match level {
                Severity::Error => level_text.red().to_string(),
                Severity::Warning => level_text.yellow().to_string(),
                Severity::Info => level_text.cyan().to_string(),
            }
        } else {
            level_text.clone()
        };

        // Pad on the plain text widths so color escapes do not skew columns.
        let mut row = position.clone();
        row.push_str(&" ".repeat(12usize.saturating_sub(position.len()).max(1)));
        let visible = row.len() + level_text.len();
        row.push_str(&shown_level);
        row.push_str(&" ".repeat(21usize.saturating_sub(visible).max(1)));
        row.push_str(&problem.desc);
        if let Some(rule) = &problem.rule {
            let tag = format!("  ({rule})");
            if self.color {
                row.push_str(&tag.dimmed().to_string());
            } else {
                row.push_str(&tag);
            }
        }
        row
    }
}

fn render_parsable(path: &Path, problems: &[Problem]) -> String {
    let filename = path.display();
    problems
        .iter()
        .map(|p| {
            let level = p.level.unwrap_or(Severity::Error);
            let message = match &p.rule {
                Some(rule) => format!("{} ({rule})", p.desc),
                None => p.desc.clone(),
            };
            format!("{filename}:{}:{}: [{level}] {message}", p.line, p.column)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_github(path: &Path, problems: &[Problem]) -> String {
    let filename = path.display();
    problems
        .iter()
        .map(|p| {
            let level = p.level.unwrap_or(Severity::Error);
            let rule_tag = p
                .rule
                .as_ref()
                .map(|rule| format!("[{rule}] "))
                .unwrap_or_default();
            format!(
                "::{level} file={filename},line={},col={}::{}:{} {rule_tag}{}",
                p.line, p.column, p.line, p.column, p.desc
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_json(path: &Path, problems: &[Problem]) -> String {
    #[derive(serde::Serialize)]
    struct JsonReport<'a> {
        file: String,
        problems: &'a [Problem],
        summary: Summary,
    }

    #[derive(serde::Serialize)]
    struct Summary {
        errors: usize,
        warnings: usize,
        infos: usize,
    }

    let count = |level| problems.iter().filter(|p| p.level == Some(level)).count();
    let report = JsonReport {
        file: path.display().to_string(),
        problems,
        summary: Summary {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
        },
    };
    serde_json::to_string_pretty(&report).unwrap_or_default()
}
