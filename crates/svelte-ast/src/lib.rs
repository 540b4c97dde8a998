//! Svelte component AST for svelte-twig.
//!
//! This crate provides typed, owned AST nodes for the document produced by the
//! Svelte compiler's `parse()` function once it has been serialized to JSON:
//! - Template nodes (elements, blocks, slots, components)
//! - The ESTree subset used by template expressions and top-level declarations
//! - Byte-offset spans for every node, and a line index to report them
//!
//! Node kinds outside the supported grammar load as `Unknown` variants rather
//! than failing the whole document.
//!
//! # Example
//!
//! ```
//! use svelte_ast::{from_json_str, TemplateNode};
//!
//! let json = r#"{
//!     "html": {
//!         "type": "Fragment",
//!         "children": [{ "type": "Text", "data": "hello" }]
//!     }
//! }"#;
//!
//! let ast = from_json_str(json).unwrap();
//! assert!(matches!(ast.html.children[0], TemplateNode::Text(_)));
//! ```

mod ast;
mod error;
mod estree;
mod line_index;
mod span;

pub use ast::*;
pub use error::AstError;
pub use estree::*;
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};

use std::path::Path;

/// Parses a serialized AST document.
pub fn from_json_str(json: &str) -> Result<SvelteAst, AstError> {
    Ok(serde_json::from_str(json)?)
}

/// Converts an already-decoded JSON value into an AST document.
pub fn from_json_value(value: serde_json::Value) -> Result<SvelteAst, AstError> {
    Ok(serde_json::from_value(value)?)
}

/// Reads and parses a serialized AST document from disk.
pub fn read_ast(path: &Path) -> Result<SvelteAst, AstError> {
    let json = std::fs::read_to_string(path).map_err(|source| AstError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json_str(&json)
}
