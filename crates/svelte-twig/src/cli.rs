//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use twig_transformer::Severity;

/// Translate Svelte components into Twig templates.
#[derive(Debug, Parser)]
#[command(name = "svelte-twig")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory containing the serialized component ASTs
    #[arg(default_value = ".")]
    pub input: Utf8PathBuf,

    /// Directory the templates and metadata are written to
    #[arg(long, short, default_value = "components")]
    pub out: Utf8PathBuf,

    /// Namespace prefixing embedded component ids (e.g. `mytheme`)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Block name used for unnamed slots and component children
    #[arg(long = "default-slot")]
    pub default_slot: Option<String>,

    /// Skip writing `*.component.yml` metadata
    #[arg(long = "no-metadata")]
    pub no_metadata: bool,

    /// Path to the config file (defaults to `svelte-twig.json` in the input directory)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Suffix of the AST files to translate
    #[arg(long)]
    pub extension: Option<String>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Minimum severity threshold
    #[arg(long, value_enum, default_value = "warning")]
    pub threshold: Threshold,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Translate and report without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
    /// Machine-readable (one line per diagnostic)
    Machine,
}

/// Severity threshold.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Threshold {
    /// Only show errors
    Error,
    /// Show errors and warnings (default)
    #[default]
    Warning,
    /// Show everything, hints included
    Hint,
}

impl Threshold {
    /// Returns whether a diagnostic of `severity` passes this threshold.
    pub fn includes(self, severity: Severity) -> bool {
        match self {
            Threshold::Error => severity == Severity::Error,
            Threshold::Warning => severity >= Severity::Warning,
            Threshold::Hint => true,
        }
    }
}
