//! Svelte to Twig transformation.
//!
//! This crate turns a parsed Svelte component into a Twig template and a
//! single-directory component metadata document. It handles:
//! - Markup and control flow (`{#if}`, `{#each}`, slots, nested components)
//! - Expressions, in template mode (`and`/`or`/`not`) and value mode
//!   (`|default`, `|merge` and guard ternaries inside hash literals)
//! - Prop type inference from `export let` initializers
//! - Slot discovery and override merging for `*.component.yml`
//!
//! # Example
//!
//! ```
//! use twig_transformer::{transform, ComponentSource, TransformOptions};
//!
//! let ast = svelte_ast::from_json_str(r#"{
//!     "html": { "type": "Fragment", "children": [
//!         { "type": "Element", "name": "br", "attributes": [], "children": [] }
//!     ] }
//! }"#).unwrap();
//!
//! let options = TransformOptions::new("mytheme");
//! let result = transform(&ComponentSource::new(ast), "Divider", None, &options).unwrap();
//! assert_eq!(result.twig, "<br />");
//! ```

mod context;
mod diagnostic;
mod metadata;
mod options;
mod template;
mod transform;
mod translate;
mod value;

pub use context::{
    build_context, ComponentContext, ComponentSource, PropDefinition, PropSchema, PropType,
};
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSink, FnSink, Severity};
pub use metadata::{
    build_metadata, deep_merge, order_keys, parse_overrides, serialize_metadata, MetadataError,
    SCHEMA_URL,
};
pub use options::{component_slug, ConfigError, TransformOptions, DEFAULT_SLOT};
pub use template::{is_void_element, resolve_slot_name, TemplateWriter};
pub use transform::{render_template, transform, TransformError, TransformResult};
pub use translate::{quote, ExpressionTranslator, TranslateError, Translation};
pub use value::ValueWriter;
