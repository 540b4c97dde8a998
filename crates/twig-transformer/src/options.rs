//! Translation options.

use thiserror::Error;

/// The block name used for unnamed slots unless configured otherwise.
pub const DEFAULT_SLOT: &str = "content";

/// Options for translation.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// The theme or module namespace that prefixes embedded component ids.
    pub namespace: String,
    /// The block name used for unnamed slots and component children.
    pub default_slot: String,
    /// Whether to produce the metadata document.
    pub metadata: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            default_slot: DEFAULT_SLOT.to_string(),
            metadata: true,
        }
    }
}

/// A configuration problem detected before any translation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No namespace was configured.
    #[error("a namespace is required (set `namespace` in the config file or pass --namespace)")]
    MissingNamespace,

    /// The namespace contains characters that cannot appear in a component id.
    #[error("invalid namespace `{0}`: use letters, digits, `_` and `-` only")]
    InvalidNamespace(String),

    /// The default slot identifier is empty.
    #[error("the default slot identifier must not be empty")]
    EmptyDefaultSlot,
}

impl TransformOptions {
    /// Creates options for the given namespace with default settings.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Checks that the options are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::MissingNamespace);
        }
        if !self
            .namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }
        if self.default_slot.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultSlot);
        }
        Ok(())
    }

    /// Derives the reference id of an embedded component from its tag name.
    ///
    /// `My-Widget` under namespace `mytheme` becomes `mytheme:my-widget`.
    pub fn component_id(&self, tag_name: &str) -> String {
        format!("{}:{}", self.namespace, component_slug(tag_name))
    }
}

/// Lower-cases a tag name and replaces every character that is not an ASCII
/// letter or digit with `-`.
pub fn component_slug(tag_name: &str) -> String {
    tag_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
