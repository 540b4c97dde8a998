//! Static inference over a component: props, slots and set-statements.
//!
//! Nothing here executes script code; every fact is read off the shape of
//! the top-level declarations and the render tree.

use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::options::TransformOptions;
use crate::template::resolve_slot_name;
use crate::translate::ExpressionTranslator;
use crate::value::ValueWriter;
use indexmap::IndexMap;
use serde::Serialize;
use svelte_ast::{
    DeclarationKind, Expression, LiteralValue, Statement, SvelteAst, TemplateNode,
    VariableDeclaration,
};

/// A parsed component together with its original source text, when known.
#[derive(Debug, Clone, Default)]
pub struct ComponentSource {
    /// The parsed component.
    pub ast: SvelteAst,
    /// The `.svelte` source the AST was parsed from.
    pub source: Option<String>,
}

impl ComponentSource {
    /// Wraps an AST with no source text.
    pub fn new(ast: SvelteAst) -> Self {
        Self { ast, source: None }
    }

    /// Attaches the original source text.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the raw text of an expression: the source slice when the
    /// source is known, then the literal's `raw` field.
    fn raw_text(&self, expr: &Expression) -> Option<String> {
        if let Some(text) = self.source.as_deref().and_then(|src| expr.span().slice(src)) {
            return Some(text.to_string());
        }
        match expr {
            Expression::Literal(literal) => literal.raw.clone(),
            _ => None,
        }
    }
}

/// The type of a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// The schema entry for one prop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropDefinition {
    /// The value type.
    #[serde(rename = "type")]
    pub prop_type: PropType,
    /// A human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// A description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// The allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<serde_json::Value>>,
}

impl PropDefinition {
    /// Creates a definition with no default.
    pub fn new(prop_type: PropType) -> Self {
        Self {
            prop_type,
            title: None,
            description: None,
            default: None,
            allowed: None,
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Props by name, in declaration order.
pub type PropSchema = IndexMap<String, PropDefinition>;

/// Everything known about a component's public interface.
#[derive(Debug, Clone, Default)]
pub struct ComponentContext {
    /// The component name.
    pub name: String,
    /// The inferred props.
    pub props: PropSchema,
    /// Slot identifiers, one per occurrence in document order.
    pub slots: Vec<String>,
    /// Bound variable name to value-mode text, later bindings winning.
    pub set_statements: IndexMap<String, String>,
    /// The user-supplied metadata override document.
    pub overrides: Option<serde_yaml::Value>,
}

/// Builds the component context.
pub fn build_context<S: DiagnosticSink + ?Sized>(
    source: &ComponentSource,
    name: &str,
    overrides: Option<serde_yaml::Value>,
    options: &TransformOptions,
    sink: &mut S,
) -> ComponentContext {
    let mut context = ComponentContext {
        name: name.to_string(),
        overrides,
        ..ComponentContext::default()
    };

    for statement in source.ast.instance_body() {
        match statement {
            Statement::ExportNamedDeclaration(export) => {
                if let Some(Statement::VariableDeclaration(decl)) = export.declaration.as_deref() {
                    collect_props(decl, source, options, sink, &mut context.props);
                }
            }
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    let (Some(name), Some(init)) = (declarator.id.as_identifier(), &declarator.init)
                    else {
                        continue;
                    };
                    bind(&mut context.set_statements, name, init, options, sink);
                }
            }
            Statement::LabeledStatement(labeled) if labeled.label.name == "$" => {
                let Statement::ExpressionStatement(stmt) = labeled.body.as_ref() else {
                    continue;
                };
                let Expression::Assignment(assign) = &stmt.expression else {
                    continue;
                };
                if assign.operator != "=" {
                    continue;
                }
                if let Some(name) = assign.left.as_identifier() {
                    bind(&mut context.set_statements, name, &assign.right, options, sink);
                }
            }
            _ => {}
        }
    }

    collect_slots(&source.ast.html.children, &options.default_slot, &mut context.slots);
    context
}

fn bind<S: DiagnosticSink + ?Sized>(
    bindings: &mut IndexMap<String, String>,
    name: &str,
    init: &Expression,
    options: &TransformOptions,
    sink: &mut S,
) {
    let value = ValueWriter::new(options, sink).expression(init);
    if !value.is_empty() {
        bindings.insert(name.to_string(), value);
    }
}

fn collect_props<S: DiagnosticSink + ?Sized>(
    decl: &VariableDeclaration,
    source: &ComponentSource,
    options: &TransformOptions,
    sink: &mut S,
    props: &mut PropSchema,
) {
    // `export const` is a read-only export, not a prop.
    if decl.kind == DeclarationKind::Const {
        return;
    }
    for declarator in &decl.declarations {
        let Some(name) = declarator.id.as_identifier() else {
            continue;
        };
        let definition = match &declarator.init {
            None => PropDefinition::new(PropType::String),
            Some(init) => infer_prop(name, init, source, options, sink),
        };
        props.insert(name.to_string(), definition);
    }
}

/// Infers a prop definition from its initializer.
fn infer_prop<S: DiagnosticSink + ?Sized>(
    name: &str,
    init: &Expression,
    source: &ComponentSource,
    options: &TransformOptions,
    sink: &mut S,
) -> PropDefinition {
    match init {
        Expression::Array(array) => {
            let elements: Vec<String> = array
                .elements
                .iter()
                .map(|element| match element {
                    Some(expr) => source
                        .raw_text(expr)
                        .unwrap_or_else(|| ValueWriter::new(options, &mut *sink).expression(expr)),
                    None => String::new(),
                })
                .collect();
            PropDefinition::new(PropType::Array).with_default(format!("[{}]", elements.join(", ")))
        }
        Expression::Object(_) => PropDefinition::new(PropType::Object),
        Expression::Literal(literal) => match literal.value() {
            LiteralValue::String(s) => PropDefinition::new(PropType::String).with_default(s),
            LiteralValue::Number(n) => {
                PropDefinition::new(PropType::Number).with_default(n.clone())
            }
            LiteralValue::Boolean(b) => PropDefinition::new(PropType::Boolean).with_default(b),
            LiteralValue::Null => PropDefinition::new(PropType::String),
            LiteralValue::Regex(_) | LiteralValue::BigInt(_) => {
                unrecognized(name, init, source, options, sink)
            }
        },
        Expression::Unary(unary) if unary.operator == "-" => match unary.argument.as_ref() {
            Expression::Literal(literal) => match literal.value() {
                LiteralValue::Number(n) => match negate(n) {
                    Some(negated) => PropDefinition::new(PropType::Number).with_default(negated),
                    None => unrecognized(name, init, source, options, sink),
                },
                _ => unrecognized(name, init, source, options, sink),
            },
            _ => unrecognized(name, init, source, options, sink),
        },
        _ => unrecognized(name, init, source, options, sink),
    }
}

fn unrecognized<S: DiagnosticSink + ?Sized>(
    name: &str,
    init: &Expression,
    source: &ComponentSource,
    options: &TransformOptions,
    sink: &mut S,
) -> PropDefinition {
    sink.report(Diagnostic::new(
        DiagnosticCode::UnrecognizedInitializer,
        format!(
            "prop `{name}` is initialized with {}; typed as string with its source text as default",
            init.kind()
        ),
        init.span(),
    ));
    let raw = source
        .raw_text(init)
        .unwrap_or_else(|| ValueWriter::new(options, &mut *sink).expression(init));
    PropDefinition::new(PropType::String).with_default(raw)
}

fn negate(n: &serde_json::Number) -> Option<serde_json::Number> {
    if let Some(i) = n.as_i64() {
        return Some(i.checked_neg()?.into());
    }
    serde_json::Number::from_f64(-n.as_f64()?)
}

/// Collects slot identifiers depth first, in document order.
fn collect_slots(nodes: &[TemplateNode], default_slot: &str, slots: &mut Vec<String>) {
    for node in nodes {
        match node {
            TemplateNode::Slot(slot) => {
                slots.push(resolve_slot_name(slot, default_slot).0);
                collect_slots(&slot.children, default_slot, slots);
            }
            TemplateNode::Fragment(fragment) => {
                collect_slots(&fragment.children, default_slot, slots)
            }
            TemplateNode::Element(element) => collect_slots(&element.children, default_slot, slots),
            TemplateNode::InlineComponent(component) => {
                collect_slots(&component.children, default_slot, slots)
            }
            TemplateNode::IfBlock(block) => {
                collect_slots(&block.children, default_slot, slots);
                if let Some(else_block) = &block.else_block {
                    collect_slots(&else_block.children, default_slot, slots);
                }
            }
            TemplateNode::EachBlock(block) => {
                collect_slots(&block.children, default_slot, slots);
                if let Some(else_block) = &block.else_block {
                    collect_slots(&else_block.children, default_slot, slots);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn component(instance: serde_json::Value, html: serde_json::Value) -> ComponentSource {
        let ast = svelte_ast::from_json_value(json!({
            "html": { "type": "Fragment", "children": html },
            "instance": { "type": "Script", "context": "default",
                          "content": { "type": "Program", "body": instance } }
        }))
        .unwrap();
        ComponentSource::new(ast)
    }

    fn export_let(name: &str, init: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "ExportNamedDeclaration",
            "declaration": {
                "type": "VariableDeclaration", "kind": "let",
                "declarations": [{
                    "type": "VariableDeclarator",
                    "id": { "type": "Identifier", "name": name },
                    "init": init
                }]
            }
        })
    }

    fn context_of(source: &ComponentSource) -> (ComponentContext, Vec<Diagnostic>) {
        let options = TransformOptions::new("mytheme");
        let mut diagnostics = Vec::new();
        let context = build_context(source, "Card", None, &options, &mut diagnostics);
        (context, diagnostics)
    }

    #[test]
    fn test_prop_inference() {
        let source = component(
            json!([
                export_let("count", json!({ "type": "Literal", "value": 0, "raw": "0" })),
                export_let("label", json!({ "type": "Literal", "value": "Hi", "raw": "'Hi'" })),
                export_let("items", json!({ "type": "ArrayExpression", "elements": [
                    { "type": "Literal", "value": 1, "raw": "1" },
                    { "type": "Literal", "value": 2, "raw": "2" }
                ] })),
                export_let("open", json!({ "type": "Literal", "value": false, "raw": "false" })),
                export_let("config", json!({ "type": "ObjectExpression", "properties": [] })),
                export_let("nothing", json!(null)),
                export_let("empty", json!({ "type": "Literal", "value": null, "raw": "null" })),
                export_let("offset", json!({ "type": "UnaryExpression", "operator": "-",
                    "argument": { "type": "Literal", "value": 4, "raw": "4" } }))
            ]),
            json!([]),
        );
        let (context, diagnostics) = context_of(&source);

        let props = &context.props;
        assert_eq!(props["count"], PropDefinition::new(PropType::Number).with_default(0));
        assert_eq!(props["label"], PropDefinition::new(PropType::String).with_default("Hi"));
        assert_eq!(props["items"], PropDefinition::new(PropType::Array).with_default("[1, 2]"));
        assert_eq!(props["open"], PropDefinition::new(PropType::Boolean).with_default(false));
        assert_eq!(props["config"], PropDefinition::new(PropType::Object));
        assert_eq!(props["nothing"], PropDefinition::new(PropType::String));
        assert_eq!(props["empty"], PropDefinition::new(PropType::String));
        assert_eq!(props["offset"], PropDefinition::new(PropType::Number).with_default(-4));
        assert_eq!(
            props.keys().collect::<Vec<_>>(),
            vec!["count", "label", "items", "open", "config", "nothing", "empty", "offset"]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unrecognized_initializer_uses_source_text() {
        let script = "<script>export let size = base * 2;</script>";
        let start = script.find("base").unwrap();
        let end = start + "base * 2".len();
        let source = component(
            json!([export_let("size", json!({
                "type": "BinaryExpression", "operator": "*", "start": start, "end": end,
                "left": { "type": "Identifier", "name": "base" },
                "right": { "type": "Literal", "value": 2, "raw": "2" }
            }))]),
            json!([]),
        )
        .with_source(script);

        let (context, diagnostics) = context_of(&source);
        assert_eq!(
            context.props["size"],
            PropDefinition::new(PropType::String).with_default("base * 2")
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnrecognizedInitializer);
        assert!(diagnostics[0].message.contains("BinaryExpression"));
    }

    #[test]
    fn test_unrecognized_initializer_without_source_is_translated() {
        let source = component(
            json!([export_let("size", json!({
                "type": "BinaryExpression", "operator": "*",
                "left": { "type": "Identifier", "name": "base" },
                "right": { "type": "Literal", "value": 2, "raw": "2" }
            }))]),
            json!([]),
        );
        let (context, _) = context_of(&source);
        assert_eq!(context.props["size"].default, Some(json!("base * 2")));
    }

    #[test]
    fn test_export_const_is_not_a_prop() {
        let source = component(
            json!([{
                "type": "ExportNamedDeclaration",
                "declaration": {
                    "type": "VariableDeclaration", "kind": "const",
                    "declarations": [{ "type": "VariableDeclarator",
                        "id": { "type": "Identifier", "name": "VERSION" },
                        "init": { "type": "Literal", "value": "1", "raw": "'1'" } }]
                }
            }]),
            json!([]),
        );
        let (context, _) = context_of(&source);
        assert!(context.props.is_empty());
    }

    #[test]
    fn test_set_statements() {
        let source = component(
            json!([
                { "type": "VariableDeclaration", "kind": "let", "declarations": [
                    { "type": "VariableDeclarator",
                      "id": { "type": "Identifier", "name": "classes" },
                      "init": { "type": "LogicalExpression", "operator": "||",
                                "left": { "type": "Identifier", "name": "extra" },
                                "right": { "type": "Literal", "value": "" } } },
                    { "type": "VariableDeclarator",
                      "id": { "type": "Identifier", "name": "handler" },
                      "init": { "type": "ArrowFunctionExpression" } },
                    { "type": "VariableDeclarator",
                      "id": { "type": "Identifier", "name": "unset" } }
                ] },
                { "type": "LabeledStatement",
                  "label": { "type": "Identifier", "name": "$" },
                  "body": { "type": "ExpressionStatement", "expression": {
                      "type": "AssignmentExpression", "operator": "=",
                      "left": { "type": "Identifier", "name": "total" },
                      "right": { "type": "BinaryExpression", "operator": "+",
                                 "left": { "type": "Identifier", "name": "a" },
                                 "right": { "type": "Identifier", "name": "b" } } } } },
                { "type": "LabeledStatement",
                  "label": { "type": "Identifier", "name": "$" },
                  "body": { "type": "ExpressionStatement", "expression": {
                      "type": "AssignmentExpression", "operator": "=",
                      "left": { "type": "Identifier", "name": "classes" },
                      "right": { "type": "Literal", "value": "card" } } } }
            ]),
            json!([]),
        );
        let (context, _) = context_of(&source);
        let bindings: Vec<(&str, &str)> = context
            .set_statements
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(bindings, vec![("classes", "'card'"), ("total", "a + b")]);
    }

    #[test]
    fn test_slots_in_document_order() {
        let slot = |name: Option<&str>| match name {
            Some(name) => json!({ "type": "Slot", "attributes": [
                { "type": "Attribute", "name": "name", "value": [{ "type": "Text", "data": name }] }
            ], "children": [] }),
            None => json!({ "type": "Slot", "attributes": [], "children": [] }),
        };
        let source = component(
            json!([]),
            json!([
                { "type": "Element", "name": "header", "attributes": [],
                  "children": [slot(Some("header"))] },
                slot(None),
                { "type": "IfBlock", "expression": { "type": "Identifier", "name": "x" },
                  "children": [slot(Some("header"))],
                  "else": { "children": [slot(Some("footer"))] } }
            ]),
        );
        let (context, diagnostics) = context_of(&source);
        assert_eq!(context.slots, vec!["header", "content", "header", "footer"]);
        // Fallback diagnostics belong to the template walk.
        assert!(diagnostics.is_empty());
    }
}
