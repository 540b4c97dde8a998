//! Configuration loading.

use crate::cli::Args;
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;
use thiserror::Error;
use twig_transformer::{TransformOptions, DEFAULT_SLOT};

/// The config file looked up in the input directory.
pub const CONFIG_FILE: &str = "svelte-twig.json";

/// The suffix of AST files unless configured otherwise.
pub const DEFAULT_EXTENSION: &str = ".svelte.json";

/// Errors loading the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The config path.
        path: String,
        /// The I/O error.
        source: std::io::Error,
    },

    /// The file is not valid JSON for the config schema.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// The config path.
        path: String,
        /// The JSON error.
        source: serde_json::Error,
    },
}

/// Project configuration from `svelte-twig.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Namespace prefixing embedded component ids.
    pub namespace: Option<String>,
    /// Block name used for unnamed slots.
    pub default_slot: Option<String>,
    /// Whether to write metadata documents.
    pub metadata: Option<bool>,
    /// Suffix of the AST files.
    pub extension: Option<String>,
    /// Glob patterns to ignore, relative to the input directory.
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    /// Loads the config file at `path`; a missing file is an empty config.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigFileError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigFileError::Read {
                    path: path.to_string(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|source| ConfigFileError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Parses config file contents.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// The effective settings of a run: CLI flags layered over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Translation options.
    pub options: TransformOptions,
    /// Suffix of the AST files.
    pub extension: String,
    /// Ignore patterns from both sources.
    pub ignore: Vec<String>,
}

impl Settings {
    /// Resolves the settings. Flags win over the file.
    pub fn resolve(args: &Args, config: ProjectConfig) -> Self {
        let options = TransformOptions {
            namespace: args
                .namespace
                .clone()
                .or(config.namespace)
                .unwrap_or_default(),
            default_slot: args
                .default_slot
                .clone()
                .or(config.default_slot)
                .unwrap_or_else(|| DEFAULT_SLOT.to_string()),
            metadata: !args.no_metadata && config.metadata.unwrap_or(true),
        };

        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        Self {
            options,
            extension: args
                .extension
                .clone()
                .or(config.extension)
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config() {
        let config = ProjectConfig::parse(
            r#"{
                "namespace": "mytheme",
                "defaultSlot": "body",
                "metadata": false,
                "ignore": ["drafts/**"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.namespace.as_deref(), Some("mytheme"));
        assert_eq!(config.default_slot.as_deref(), Some("body"));
        assert_eq!(config.metadata, Some(false));
        assert_eq!(config.ignore, vec!["drafts/**"]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ProjectConfig::parse(r#"{ "namspace": "typo" }"#).is_err());
    }

    #[test]
    fn test_flags_win_over_file() {
        let args = Args::parse_from(["svelte-twig", "--namespace", "cli", "--ignore", "a/**"]);
        let config = ProjectConfig {
            namespace: Some("file".to_string()),
            default_slot: Some("body".to_string()),
            ignore: vec!["b/**".to_string()],
            ..ProjectConfig::default()
        };

        let settings = Settings::resolve(&args, config);
        assert_eq!(settings.options.namespace, "cli");
        assert_eq!(settings.options.default_slot, "body");
        assert!(settings.options.metadata);
        assert_eq!(settings.extension, DEFAULT_EXTENSION);
        assert_eq!(settings.ignore, vec!["b/**", "a/**"]);
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Args::parse_from(["svelte-twig", "--no-metadata"]);
        let settings = Settings::resolve(&args, ProjectConfig::default());
        assert_eq!(settings.options.namespace, "");
        assert_eq!(settings.options.default_slot, DEFAULT_SLOT);
        assert!(!settings.options.metadata);
    }

    #[test]
    fn test_missing_config_file() {
        let config = ProjectConfig::load(Utf8Path::new("/definitely/not/here/svelte-twig.json"))
            .unwrap();
        assert!(config.namespace.is_none());
    }
}
