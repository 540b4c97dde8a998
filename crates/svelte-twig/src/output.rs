//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use serde::Serialize;
use svelte_ast::{LineCol, LineIndex};
use twig_transformer::{Diagnostic, Severity};

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error, Warning, Hint).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

/// A position in the component source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number, 0 when the source text is unavailable.
    pub line: u32,
    /// 1-indexed column number, 0 when the source text is unavailable.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Resolves offsets to positions when the component source is known.
struct Locator(Option<LineIndex>);

impl Locator {
    fn new(source: Option<&str>) -> Self {
        Self(source.map(LineIndex::new))
    }

    fn line_col(&self, offset: svelte_ast::ByteOffset) -> Option<LineCol> {
        self.0.as_ref()?.line_col(offset)
    }

    fn position(&self, offset: svelte_ast::ByteOffset) -> Position {
        let (line, column) = match self.line_col(offset) {
            Some(lc) => (lc.line + 1, lc.col + 1),
            None => (0, 0),
        };
        Position {
            line,
            column,
            offset: u32::from(offset),
        }
    }

    /// `path:line:col`, or `path` alone without a source.
    fn location(&self, file_path: &Utf8Path, offset: svelte_ast::ByteOffset) -> String {
        match self.line_col(offset) {
            Some(lc) => format!("{}:{}:{}", file_path, lc.line + 1, lc.col + 1),
            None => file_path.to_string(),
        }
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the diagnostics of one file. `source` is the component's
    /// `.svelte` text when it was found next to the AST.
    pub fn format(
        &self,
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: Option<&str>,
    ) -> String {
        match self.format {
            OutputFormat::Human => format_human(diagnostics, file_path, source),
            OutputFormat::Json => {
                let formatted = Self::format_json_diagnostics(diagnostics, file_path, source);
                serde_json::to_string_pretty(&formatted).unwrap_or_default()
            }
            OutputFormat::Machine => format_machine(diagnostics, file_path, source),
        }
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(
        diagnostics: &[Diagnostic],
        file_path: &Utf8Path,
        source: Option<&str>,
    ) -> Vec<FormattedDiagnostic> {
        let locator = Locator::new(source);
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                diagnostic_type: diag.severity.as_str().to_string(),
                filename: file_path.to_string(),
                start: locator.position(diag.span.start),
                end: locator.position(diag.span.end),
                message: diag.message.clone(),
                code: diag.code.to_string(),
            })
            .collect()
    }
}

fn format_human(diagnostics: &[Diagnostic], file_path: &Utf8Path, source: Option<&str>) -> String {
    let locator = Locator::new(source);
    let mut output = String::new();
    for diag in diagnostics {
        output.push_str(&format!(
            "{}\n{}: {} ({})\n\n",
            locator.location(file_path, diag.span.start),
            diag.severity.as_str(),
            diag.message,
            diag.code
        ));
    }
    output
}

fn format_machine(
    diagnostics: &[Diagnostic],
    file_path: &Utf8Path,
    source: Option<&str>,
) -> String {
    let locator = Locator::new(source);
    let mut output = String::new();
    for diag in diagnostics {
        let severity = match diag.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Hint => "HINT",
        };
        let start = locator.position(diag.span.start);
        let end = locator.position(diag.span.end);
        output.push_str(&format!(
            "{} {}:{}:{}:{}:{} {} ({})\n",
            severity,
            file_path,
            start.line,
            start.column,
            end.line,
            end.column,
            diag.message,
            diag.code
        ));
    }
    output
}

/// Summary of a translation run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of AST files found.
    pub file_count: usize,
    /// Number of templates written.
    pub written_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Whether to fail on warnings.
    pub fail_on_warnings: bool,
}

impl RunSummary {
    /// Returns true when the run should exit with a failure status.
    pub fn failed(&self) -> bool {
        self.error_count > 0 || (self.fail_on_warnings && self.warning_count > 0)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        format!(
            "svelte-twig translated {} of {} {} with {} {} and {} {}",
            self.written_count,
            self.file_count,
            plural(self.file_count, "file", "files"),
            self.error_count,
            plural(self.error_count, "error", "errors"),
            self.warning_count,
            plural(self.warning_count, "warning", "warnings"),
        )
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
