//! The component metadata document (`*.component.yml`).

use crate::context::ComponentContext;
use indexmap::IndexSet;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// The JSON schema every metadata document points at.
pub const SCHEMA_URL: &str =
    "https://git.drupalcode.org/project/drupal/-/raw/HEAD/core/assets/schemas/v1/metadata.schema.json";

/// Recognized top-level keys, in output order. Other keys follow them.
const KEY_ORDER: [&str; 9] = [
    "$schema",
    "name",
    "description",
    "group",
    "status",
    "props",
    "slots",
    "libraryOverrides",
    "thirdPartySettings",
];

/// Errors producing a metadata document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The override file is not valid YAML.
    #[error("invalid override document: {0}")]
    InvalidOverrides(#[source] serde_yaml::Error),

    /// The override document is valid YAML but not a mapping.
    #[error("the override document must be a mapping, found {0}")]
    OverridesNotMapping(&'static str),

    /// The merged document could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Parses an override document. An empty document means no overrides.
pub fn parse_overrides(text: &str) -> Result<Option<Value>, MetadataError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_yaml::from_str(text).map_err(MetadataError::InvalidOverrides)?;
    match value {
        Value::Null => Ok(None),
        Value::Mapping(_) => Ok(Some(value)),
        other => Err(MetadataError::OverridesNotMapping(kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Merges `overlay` into `base`. Mappings merge key by key with `overlay`
/// winning; every other value, sequences included, is replaced whole.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Puts recognized keys first in their fixed order, then every other key in
/// its existing order.
pub fn order_keys(mapping: Mapping) -> Mapping {
    let mut known: Vec<Option<(Value, Value)>> = vec![None; KEY_ORDER.len()];
    let mut rest = Vec::new();
    for (key, value) in mapping {
        match key.as_str().and_then(|k| KEY_ORDER.iter().position(|o| *o == k)) {
            Some(index) => known[index] = Some((key, value)),
            None => rest.push((key, value)),
        }
    }
    known.into_iter().flatten().chain(rest).collect()
}

/// Builds the metadata inferred from the context alone.
pub fn inferred_metadata(context: &ComponentContext) -> Result<Value, MetadataError> {
    let mut document = Mapping::new();
    document.insert("$schema".into(), SCHEMA_URL.into());
    document.insert("name".into(), context.name.as_str().into());

    if !context.props.is_empty() {
        let properties = serde_yaml::to_value(&context.props).map_err(MetadataError::Serialize)?;
        let mut props = Mapping::new();
        props.insert("type".into(), "object".into());
        props.insert("properties".into(), properties);
        document.insert("props".into(), Value::Mapping(props));
    }

    let slots: IndexSet<&str> = context.slots.iter().map(String::as_str).collect();
    if !slots.is_empty() {
        let slots: Mapping = slots
            .into_iter()
            .map(|name| (Value::from(name), Value::Mapping(Mapping::new())))
            .collect();
        document.insert("slots".into(), Value::Mapping(slots));
    }

    Ok(Value::Mapping(document))
}

/// Builds the final metadata: inferred, overrides merged on top, keys ordered.
pub fn build_metadata(context: &ComponentContext) -> Result<Value, MetadataError> {
    let mut document = inferred_metadata(context)?;
    if let Some(overrides) = &context.overrides {
        deep_merge(&mut document, overrides.clone());
    }
    Ok(match document {
        Value::Mapping(mapping) => Value::Mapping(order_keys(mapping)),
        other => other,
    })
}

/// Renders the metadata document as YAML.
pub fn serialize_metadata(context: &ComponentContext) -> Result<String, MetadataError> {
    let document = build_metadata(context)?;
    serde_yaml::to_string(&document).map_err(MetadataError::Serialize)
}
