//! Main transformation entry point.

use crate::context::{build_context, ComponentContext, ComponentSource};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::metadata::{serialize_metadata, MetadataError};
use crate::options::{ConfigError, TransformOptions};
use crate::template::TemplateWriter;
use thiserror::Error;

/// Result of transforming one component.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// The Twig template.
    pub twig: String,
    /// The metadata document, when enabled in the options.
    pub metadata: Option<String>,
    /// The inferred component context.
    pub context: ComponentContext,
    /// Diagnostics reported while translating.
    pub diagnostics: Vec<Diagnostic>,
}

/// Errors that stop a component from being transformed at all.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The options are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The metadata document could not be produced.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Transforms a component into a Twig template and its metadata document.
///
/// Node-level faults never fail the transform; they are dropped from the
/// output and reported in [`TransformResult::diagnostics`].
pub fn transform(
    source: &ComponentSource,
    name: &str,
    overrides: Option<serde_yaml::Value>,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    options.validate()?;

    let mut diagnostics = Vec::new();
    let context = build_context(source, name, overrides, options, &mut diagnostics);
    let twig = render_template(source, &context, options, &mut diagnostics);
    let metadata = if options.metadata {
        Some(serialize_metadata(&context)?)
    } else {
        None
    };

    Ok(TransformResult {
        twig,
        metadata,
        context,
        diagnostics,
    })
}

/// Renders the Twig template: the `set` prelude followed by the render tree.
pub fn render_template<S: DiagnosticSink + ?Sized>(
    source: &ComponentSource,
    context: &ComponentContext,
    options: &TransformOptions,
    sink: &mut S,
) -> String {
    let mut output = String::new();
    for (name, value) in &context.set_statements {
        output.push_str(&format!("{{% set {name} = {value} %}}\n"));
    }
    output.push_str(&TemplateWriter::new(options, sink).fragment(&source.ast.html.children));
    output
}
