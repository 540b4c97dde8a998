//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{ConfigFileError, ProjectConfig, Settings, CONFIG_FILE};
use crate::output::{FormattedDiagnostic, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic as MietteDiagnostic;
use rayon::prelude::*;
use std::fs;
use thiserror::Error;
use twig_transformer::{
    component_slug, parse_overrides, transform, ComponentSource, ConfigError, Diagnostic,
    DiagnosticCode, Severity, TransformError,
};
use walkdir::WalkDir;

/// Orchestration errors. Each of these aborts the run before any file is
/// translated.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum OrchestratorError {
    /// The config file could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(svelte_twig::config_file))]
    ConfigFile(#[from] ConfigFileError),

    /// The resolved options are unusable.
    #[error(transparent)]
    #[diagnostic(
        code(svelte_twig::options),
        help("set `namespace` in svelte-twig.json or pass --namespace")
    )]
    Options(#[from] ConfigError),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(svelte_twig::glob))]
    InvalidGlob(String),

    /// The input directory does not exist.
    #[error("input directory not found: {0}")]
    #[diagnostic(code(svelte_twig::input))]
    MissingInput(Utf8PathBuf),
}

/// The outcome of translating one AST file.
struct FileReport {
    relative_path: Utf8PathBuf,
    source: Option<String>,
    diagnostics: Vec<Diagnostic>,
    written: bool,
}

/// Runs the translation over every AST file under the input directory.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let input = absolute(&args.input);
    if !input.is_dir() {
        return Err(OrchestratorError::MissingInput(input));
    }
    let out = absolute(&args.out);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| input.join(CONFIG_FILE));
    let settings = Settings::resolve(args, ProjectConfig::load(&config_path)?);
    settings.options.validate()?;

    let ignore_set = build_ignore_set(&settings.ignore)?;
    let files = discover(&input, &out, &settings.extension, &ignore_set);

    // Files are independent; reports come back in path order.
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| process_file(path, &input, &out, &settings, args.dry_run))
        .collect();

    let formatter = Formatter::new(args.output);
    let mut summary = RunSummary {
        file_count: files.len(),
        fail_on_warnings: args.fail_on_warnings,
        ..RunSummary::default()
    };
    let mut json_output: Vec<FormattedDiagnostic> = Vec::new();

    for mut report in reports {
        if report.written {
            summary.written_count += 1;
        }
        report
            .diagnostics
            .retain(|diag| args.threshold.includes(diag.severity));
        for diag in &report.diagnostics {
            match diag.severity {
                Severity::Error => summary.error_count += 1,
                Severity::Warning => summary.warning_count += 1,
                Severity::Hint => {}
            }
        }
        if report.diagnostics.is_empty() {
            continue;
        }

        let source = report.source.as_deref();
        if args.output == OutputFormat::Json {
            json_output.extend(Formatter::format_json_diagnostics(
                &report.diagnostics,
                &report.relative_path,
                source,
            ));
        } else {
            print!(
                "{}",
                formatter.format(&report.diagnostics, &report.relative_path, source)
            );
        }
    }

    if args.output == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string())
        );
    } else {
        eprintln!("{}", summary.format());
    }

    Ok(summary)
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| Utf8PathBuf::try_from(cwd).ok())
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    for pattern in ["**/node_modules/**", "**/.git/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Finds AST files under `input`, sorted, skipping the output directory.
fn discover(
    input: &Utf8Path,
    out: &Utf8Path,
    extension: &str,
    ignore: &GlobSet,
) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| !p.starts_with(out))
        .filter(|p| {
            let file_name = p.file_name().unwrap_or("");
            file_name.len() > extension.len() && file_name.ends_with(extension)
        })
        .filter(|p| {
            let relative = p.strip_prefix(input).unwrap_or(p);
            !ignore.is_match(relative.as_str())
        })
        .collect();
    files.sort();
    files
}

/// Paths derived from one AST file.
struct ComponentPaths {
    /// The component name (the file name without the AST suffix).
    name: String,
    /// The original `.svelte` source.
    source: Utf8PathBuf,
    /// The metadata override document.
    overrides: Utf8PathBuf,
    /// The directory the outputs go to.
    out_dir: Utf8PathBuf,
    /// The output file stem.
    id: String,
}

impl ComponentPaths {
    fn new(path: &Utf8Path, input: &Utf8Path, out: &Utf8Path, extension: &str) -> Self {
        let file_name = path.file_name().unwrap_or("");
        let name = file_name.strip_suffix(extension).unwrap_or(file_name).to_string();
        let dir = path.parent().unwrap_or(input);
        let relative_dir = dir.strip_prefix(input).unwrap_or(Utf8Path::new(""));
        let id = component_slug(&name);

        Self {
            source: dir.join(format!("{name}.svelte")),
            overrides: dir.join(format!("{name}.override.yml")),
            out_dir: out.join(relative_dir).join(&id),
            name,
            id,
        }
    }
}

fn process_file(
    path: &Utf8Path,
    input: &Utf8Path,
    out: &Utf8Path,
    settings: &Settings,
    dry_run: bool,
) -> FileReport {
    let paths = ComponentPaths::new(path, input, out, &settings.extension);
    let mut report = FileReport {
        relative_path: path.strip_prefix(input).unwrap_or(path).to_path_buf(),
        source: fs::read_to_string(&paths.source).ok(),
        diagnostics: Vec::new(),
        written: false,
    };

    let ast = match svelte_ast::read_ast(path.as_std_path()) {
        Ok(ast) => ast,
        Err(e) => {
            report.diagnostics.push(file_error(DiagnosticCode::LoadError, e));
            return report;
        }
    };

    let overrides = match read_overrides(&paths.overrides) {
        Ok(overrides) => overrides,
        Err(message) => {
            report
                .diagnostics
                .push(file_error(DiagnosticCode::MetadataError, message));
            return report;
        }
    };

    let component = ComponentSource {
        ast,
        source: report.source.clone(),
    };
    let result = match transform(&component, &paths.name, overrides, &settings.options) {
        Ok(result) => result,
        Err(TransformError::Metadata(e)) => {
            report.diagnostics.push(file_error(DiagnosticCode::MetadataError, e));
            return report;
        }
        Err(e @ TransformError::Config(_)) => {
            report.diagnostics.push(file_error(DiagnosticCode::LoadError, e));
            return report;
        }
    };
    report.diagnostics.extend(result.diagnostics);

    if dry_run {
        return report;
    }
    match write_outputs(&paths, &result.twig, result.metadata.as_deref()) {
        Ok(()) => report.written = true,
        Err(e) => report.diagnostics.push(file_error(
            DiagnosticCode::WriteError,
            format!("failed to write {}: {e}", paths.out_dir),
        )),
    }
    report
}

fn read_overrides(path: &Utf8Path) -> Result<Option<serde_yaml::Value>, String> {
    match fs::read_to_string(path) {
        Ok(text) => parse_overrides(&text).map_err(|e| format!("{path}: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("failed to read {path}: {e}")),
    }
}

fn write_outputs(
    paths: &ComponentPaths,
    twig: &str,
    metadata: Option<&str>,
) -> std::io::Result<()> {
    fs::create_dir_all(&paths.out_dir)?;
    fs::write(paths.out_dir.join(format!("{}.twig", paths.id)), twig)?;
    if let Some(metadata) = metadata {
        fs::write(paths.out_dir.join(format!("{}.component.yml", paths.id)), metadata)?;
    }
    Ok(())
}

fn file_error(code: DiagnosticCode, error: impl std::fmt::Display) -> Diagnostic {
    Diagnostic::new(code, error.to_string(), Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_paths() {
        let paths = ComponentPaths::new(
            Utf8Path::new("/src/ast/cards/My-Widget.svelte.json"),
            Utf8Path::new("/src/ast"),
            Utf8Path::new("/dist"),
            ".svelte.json",
        );
        assert_eq!(paths.name, "My-Widget");
        assert_eq!(paths.id, "my-widget");
        assert_eq!(paths.source, "/src/ast/cards/My-Widget.svelte");
        assert_eq!(paths.overrides, "/src/ast/cards/My-Widget.override.yml");
        assert_eq!(paths.out_dir, "/dist/cards/my-widget");
    }

    #[test]
    fn test_ignore_set() {
        let set = build_ignore_set(&["drafts/**".to_string()]).unwrap();
        assert!(set.is_match("drafts/Card.svelte.json"));
        assert!(set.is_match("app/node_modules/x/Card.svelte.json"));
        assert!(!set.is_match("cards/Card.svelte.json"));

        assert!(matches!(
            build_ignore_set(&["[".to_string()]),
            Err(OrchestratorError::InvalidGlob(_))
        ));
    }
}
