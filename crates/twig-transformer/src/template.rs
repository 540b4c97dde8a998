//! Template-mode translation: render tree to Twig markup.
//!
//! Converts Svelte template nodes into Twig text. Every node goes through
//! [`TemplateWriter::node`], which isolates a failing node so that only that
//! node's output is lost.

use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::options::TransformOptions;
use crate::translate::{
    binary_operator, call_text, concat_text, literal_text, member_text, quote, settle,
    ExpressionTranslator, TranslateError, Translation,
};
use crate::value::ValueWriter;
use svelte_ast::*;

/// Elements rendered as `<name />` with no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true if `name` is a void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Resolves the block name of a slot. The flag is true when the slot had no
/// static name and took `default_slot`.
pub fn resolve_slot_name(slot: &Slot, default_slot: &str) -> (String, bool) {
    match slot.explicit_name() {
        Some(name) => (name, false),
        None => (default_slot.to_string(), true),
    }
}

/// Translates template nodes in template mode.
pub struct TemplateWriter<'a, S: DiagnosticSink + ?Sized> {
    options: &'a TransformOptions,
    sink: &'a mut S,
}

impl<'a, S: DiagnosticSink + ?Sized> TemplateWriter<'a, S> {
    /// Creates a template-mode writer reporting into `sink`.
    pub fn new(options: &'a TransformOptions, sink: &'a mut S) -> Self {
        Self { options, sink }
    }

    /// Translates a list of sibling nodes.
    pub fn fragment(&mut self, nodes: &[TemplateNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            output.push_str(&self.node(node));
        }
        output
    }

    /// Translates one node; a fault yields an empty string and a diagnostic.
    pub fn node(&mut self, node: &TemplateNode) -> String {
        let result = match node {
            TemplateNode::Fragment(fragment) => Ok(self.fragment(&fragment.children)),
            TemplateNode::Element(element) => self.element(element),
            TemplateNode::Text(text) => Ok(text.source_text().to_string()),
            TemplateNode::Comment(comment) => Ok(format!("{{# {} #}}", comment.data.trim())),
            TemplateNode::MustacheTag(tag) => Ok(self.interpolate(&tag.expression)),
            TemplateNode::RawMustacheTag(tag) => self.raw_tag(tag),
            TemplateNode::IfBlock(block) => self.if_block(block),
            TemplateNode::EachBlock(block) => self.each_block(block),
            TemplateNode::InlineComponent(component) => self.inline_component(component),
            TemplateNode::Slot(slot) => Ok(self.slot(slot)),
            TemplateNode::Unknown => Err(TranslateError::Unsupported("template node")),
        };
        settle(result, node.span(), |d| self.sink.report(d))
    }

    fn element(&mut self, element: &Element) -> Translation {
        let mut attributes = String::new();
        for attribute in &element.attributes {
            let result = match attribute {
                Attribute::Normal(attr) => self.attribute(attr),
                Attribute::Spread(_) => Err(TranslateError::Unsupported("spread attribute")),
                Attribute::Unknown => Err(TranslateError::Unsupported("directive")),
            };
            let span = match attribute {
                Attribute::Normal(attr) => attr.span,
                Attribute::Spread(spread) => spread.span,
                Attribute::Unknown => element.span,
            };
            let text = settle(result, span, |d| self.sink.report(d));
            if !text.is_empty() {
                attributes.push(' ');
                attributes.push_str(&text);
            }
        }

        if is_void_element(&element.name) {
            return Ok(format!("<{}{attributes} />", element.name));
        }
        let children = self.fragment(&element.children);
        Ok(format!("<{name}{attributes}>{children}</{name}>", name = element.name))
    }

    fn attribute(&mut self, attr: &NormalAttribute) -> Translation {
        let parts = match &attr.value {
            AttributeValue::Bool(true) => return Ok(attr.name.to_string()),
            AttributeValue::Bool(false) => {
                return Err(TranslateError::Unsupported("false attribute"))
            }
            AttributeValue::Parts(parts) => parts,
        };

        let mut value = String::new();
        for part in parts {
            match part {
                AttributeValuePart::Text(text) => {
                    value.push_str(&text.source_text().replace('"', "&quot;"))
                }
                other => {
                    if let Some(expr) = other.expression() {
                        value.push_str(&self.interpolate(expr));
                    }
                }
            }
        }
        Ok(format!("{}=\"{value}\"", attr.name))
    }

    /// Renders an expression at markup level: `{{ expr }}`, or for a template
    /// literal its text with `{{ }}` around each embedded expression.
    fn interpolate(&mut self, expr: &Expression) -> String {
        let Expression::TemplateLiteral(literal) = expr else {
            return self.output_tag(expr);
        };

        let mut output = String::new();
        for segment in &literal.segments {
            match segment {
                TemplateSegment::Text(text) => output.push_str(text),
                TemplateSegment::Expression(expr) => output.push_str(&self.output_tag(expr)),
            }
        }
        output
    }

    fn output_tag(&mut self, expr: &Expression) -> String {
        let text = self.expression(expr);
        if text.is_empty() {
            return text;
        }
        format!("{{{{ {text} }}}}")
    }

    fn raw_tag(&mut self, tag: &MustacheTag) -> Translation {
        let text = self.filter_operand(&tag.expression);
        if text.is_empty() {
            return Ok(text);
        }
        Ok(format!("{{{{ {text}|raw }}}}"))
    }

    fn if_block(&mut self, block: &IfBlock) -> Translation {
        let test = self.expression(&block.expression);
        if test.is_empty() {
            return Err(TranslateError::node("IfBlock", "the condition could not be translated"));
        }
        // `{:else}` has no rendering; only the consequent is emitted.
        let children = self.fragment(&block.children);
        Ok(format!("{{% if {test} %}}{children}{{% endif %}}"))
    }

    fn each_block(&mut self, block: &EachBlock) -> Translation {
        let iterable = self.expression(&block.expression);
        if iterable.is_empty() {
            return Err(TranslateError::node(
                "EachBlock",
                "the iterated expression could not be translated",
            ));
        }

        let mut prelude = String::new();
        let targets = match &block.context {
            Some(Pattern::ArrayPattern(pattern)) => loop_targets(pattern)?,
            context => {
                let binding = format!("{}_item", sanitize_binding(&iterable));
                if let Some(pattern) = context {
                    self.rebind(pattern, &binding, &mut prelude)?;
                }
                binding
            }
        };
        if let Some(index) = &block.index {
            prelude.push_str(&format!("{{% set {index} = loop.index0 %}}"));
        }

        let children = self.fragment(&block.children);
        let fallback = match &block.else_block {
            Some(else_block) => format!("{{% else %}}{}", self.fragment(&else_block.children)),
            None => String::new(),
        };
        Ok(format!(
            "{{% for {targets} in {iterable} %}}{prelude}{children}{fallback}{{% endfor %}}"
        ))
    }

    /// Binds the names of an each-block context to the synthesized loop
    /// variable, one level deep.
    fn rebind(
        &mut self,
        pattern: &Pattern,
        binding: &str,
        prelude: &mut String,
    ) -> Result<(), TranslateError> {
        match pattern {
            Pattern::Identifier(ident) => {
                prelude.push_str(&format!("{{% set {} = {binding} %}}", ident.name));
            }
            Pattern::ObjectPattern(object) => {
                for member in &object.properties {
                    let ObjectPatternMember::Property(property) = member else {
                        return Err(TranslateError::node(
                            "EachBlock",
                            "rest elements cannot be bound in a loop",
                        ));
                    };
                    let key = match (&property.key, property.computed) {
                        (Expression::Identifier(key), false) => key.name.clone(),
                        _ => {
                            return Err(TranslateError::node(
                                "EachBlock",
                                "only identifier keys can be destructured",
                            ))
                        }
                    };
                    let access = format!("{binding}.{key}");
                    match &property.value {
                        Pattern::Identifier(name) => {
                            prelude.push_str(&format!("{{% set {} = {access} %}}", name.name));
                        }
                        Pattern::AssignmentPattern(assign) => {
                            let Some(name) = assign.left.as_identifier() else {
                                return Err(nested_pattern());
                            };
                            let fallback = ValueWriter::new(self.options, &mut *self.sink)
                                .expression(&assign.right);
                            prelude.push_str(&format!(
                                "{{% set {name} = {access}|default({fallback}) %}}"
                            ));
                        }
                        _ => return Err(nested_pattern()),
                    }
                }
            }
            other => {
                return Err(TranslateError::node(
                    "EachBlock",
                    format!("{} cannot bind a loop item", other.kind()),
                ))
            }
        }
        Ok(())
    }

    fn slot(&mut self, slot: &Slot) -> String {
        let (name, fallback) = resolve_slot_name(slot, &self.options.default_slot);
        if fallback {
            self.sink.report(Diagnostic::new(
                DiagnosticCode::SlotNameFallback,
                format!("slot has no static name; using the default block `{name}`"),
                slot.span,
            ));
        }
        let children = self.fragment(&slot.children);
        format!("{{% block {name} %}}{children}{{% endblock %}}")
    }

    fn inline_component(&mut self, component: &InlineComponent) -> Translation {
        let id = quote(&self.options.component_id(&component.name));
        let with = match ValueWriter::new(self.options, &mut *self.sink)
            .component_arguments(&component.attributes)
        {
            Some(arguments) => format!(" with {arguments}"),
            None => String::new(),
        };

        if !has_content(&component.children) {
            return Ok(format!("{{% include {id}{with} only %}}"));
        }
        let children = self.fragment(&component.children);
        let slot = &self.options.default_slot;
        Ok(format!(
            "{{% embed {id}{with} only %}}\
             {{% block {slot} %}}{children}{{% endblock %}}{{% endembed %}}"
        ))
    }
}

impl<S: DiagnosticSink + ?Sized> ExpressionTranslator for TemplateWriter<'_, S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    fn identifier(&mut self, node: &Identifier) -> Translation {
        Ok(node.name.to_string())
    }

    fn literal(&mut self, node: &Literal) -> Translation {
        literal_text(node)
    }

    fn binary(&mut self, node: &BinaryExpression) -> Translation {
        let left = self.operand(&node.left);
        let right = self.operand(&node.right);
        Ok(format!("{left} {} {right}", binary_operator(&node.operator)))
    }

    fn logical(&mut self, node: &LogicalExpression) -> Translation {
        let operator = match node.operator.as_str() {
            "&&" => "and",
            "||" => "or",
            "??" => "??",
            other => {
                return Err(TranslateError::node(
                    "LogicalExpression",
                    format!("unknown operator `{other}`"),
                ))
            }
        };
        let left = self.operand(&node.left);
        let right = self.operand(&node.right);
        Ok(format!("{left} {operator} {right}"))
    }

    fn conditional(&mut self, node: &ConditionalExpression) -> Translation {
        let test = self.operand(&node.test);
        let consequent = self.operand(&node.consequent);
        let alternate = self.operand(&node.alternate);
        Ok(format!("{test} ? {consequent} : {alternate}"))
    }

    fn unary(&mut self, node: &UnaryExpression) -> Translation {
        match node.operator.as_str() {
            "!" => Ok(format!("not {}", self.operand(&node.argument))),
            "-" | "+" => Ok(format!("{}{}", node.operator, self.operand(&node.argument))),
            other => Err(TranslateError::node(
                "UnaryExpression",
                format!("operator `{other}` has no Twig equivalent"),
            )),
        }
    }

    fn call(&mut self, node: &CallExpression) -> Translation {
        call_text(self, node)
    }

    fn member(&mut self, node: &MemberExpression) -> Translation {
        member_text(self, node)
    }

    fn array(&mut self, node: &ArrayExpression) -> Translation {
        ValueWriter::new(self.options, &mut *self.sink).array(node)
    }

    fn object(&mut self, node: &ObjectExpression) -> Translation {
        ValueWriter::new(self.options, &mut *self.sink).object(node)
    }

    fn spread(&mut self, node: &SpreadElement) -> Translation {
        Ok(format!("...{}", self.operand(&node.argument)))
    }

    fn template_literal(&mut self, node: &TemplateLiteral) -> Translation {
        concat_text(self, node)
    }
}

fn loop_targets(pattern: &ArrayPattern) -> Result<String, TranslateError> {
    if pattern.elements.is_empty() || pattern.elements.len() > 2 {
        return Err(TranslateError::node(
            "EachBlock",
            "array bindings must name one or two loop variables",
        ));
    }
    let names = pattern
        .elements
        .iter()
        .map(|element| match element {
            Some(Pattern::Identifier(ident)) => Ok(ident.name.to_string()),
            _ => Err(nested_pattern()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.join(", "))
}

fn nested_pattern() -> TranslateError {
    TranslateError::node("EachBlock", "nested destructuring in a loop binding is not supported")
}

/// Replaces every non-alphanumeric character with `_`.
fn sanitize_binding(expression: &str) -> String {
    expression
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Whitespace-only children count as no children.
fn has_content(children: &[TemplateNode]) -> bool {
    children
        .iter()
        .any(|child| !matches!(child, TemplateNode::Text(text) if text.data.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(node: serde_json::Value) -> (String, Vec<Diagnostic>) {
        let node: TemplateNode = serde_json::from_value(node).unwrap();
        let options = TransformOptions::new("mytheme");
        let mut diagnostics = Vec::new();
        let text = TemplateWriter::new(&options, &mut diagnostics).node(&node);
        (text, diagnostics)
    }

    fn ident(name: &str) -> serde_json::Value {
        json!({ "type": "Identifier", "name": name })
    }

    fn text(data: &str) -> serde_json::Value {
        json!({ "type": "Text", "data": data })
    }

    fn mustache(expression: serde_json::Value) -> serde_json::Value {
        json!({ "type": "MustacheTag", "expression": expression })
    }

    #[test]
    fn test_void_elements_self_close() {
        let (out, _) = render(json!({
            "type": "Element", "name": "br", "attributes": [], "children": []
        }));
        assert_eq!(out, "<br />");

        let (out, _) = render(json!({
            "type": "Element", "name": "div", "attributes": [], "children": []
        }));
        assert_eq!(out, "<div></div>");
    }

    #[test]
    fn test_boolean_attribute() {
        let (out, _) = render(json!({
            "type": "Element", "name": "input",
            "attributes": [
                { "type": "Attribute", "name": "disabled", "value": true },
                { "type": "Attribute", "name": "name", "value": [text("q")] }
            ],
            "children": []
        }));
        assert_eq!(out, r#"<input disabled name="q" />"#);
    }

    #[test]
    fn test_attribute_interpolation() {
        let (out, _) = render(json!({
            "type": "Element", "name": "a",
            "attributes": [
                { "type": "Attribute", "name": "href",
                  "value": [text("/users/"), mustache(ident("id"))] },
                { "type": "Attribute", "name": "title",
                  "value": [{ "type": "AttributeShorthand", "expression": ident("title") }] },
                { "type": "EventHandler", "name": "click" }
            ],
            "children": [mustache(ident("label"))]
        }));
        assert_eq!(
            out,
            r#"<a href="/users/{{ id }}" title="{{ title }}">{{ label }}</a>"#
        );
    }

    #[test]
    fn test_template_literal_attribute_is_interleaved() {
        let (out, _) = render(json!({
            "type": "Element", "name": "button",
            "attributes": [{ "type": "Attribute", "name": "class", "value": [mustache(json!({
                "type": "TemplateLiteral",
                "quasis": [
                    { "type": "TemplateElement", "start": 10, "value": { "raw": "btn btn-", "cooked": "btn btn-" } },
                    { "type": "TemplateElement", "start": 28, "value": { "raw": "", "cooked": "" }, "tail": true }
                ],
                "expressions": [{ "type": "Identifier", "start": 20, "name": "variant" }]
            }))] }],
            "children": [text("Go")]
        }));
        assert_eq!(out, r#"<button class="btn btn-{{ variant }}">Go</button>"#);
    }

    #[test]
    fn test_equality_operators() {
        for (op, twig) in [("===", "=="), ("==", "=="), ("!==", "!="), ("!=", "!=")] {
            let (out, _) = render(mustache(json!({
                "type": "BinaryExpression", "operator": op,
                "left": ident("a"), "right": { "type": "Literal", "value": 1 }
            })));
            assert_eq!(out, format!("{{{{ a {twig} 1 }}}}"));
        }
    }

    #[test]
    fn test_logical_operators_in_template_mode() {
        let (out, _) = render(json!({
            "type": "IfBlock",
            "expression": {
                "type": "LogicalExpression", "operator": "||",
                "left": { "type": "UnaryExpression", "operator": "!", "argument": ident("a") },
                "right": { "type": "LogicalExpression", "operator": "&&",
                           "left": ident("b"), "right": ident("c") }
            },
            "children": [text("x")],
            "else": { "children": [text("y")] }
        }));
        assert_eq!(out, "{% if not a or (b and c) %}x{% endif %}");
    }

    #[test]
    fn test_raw_mustache() {
        let (out, _) = render(json!({ "type": "RawMustacheTag", "expression": ident("html") }));
        assert_eq!(out, "{{ html|raw }}");

        let (out, _) = render(json!({
            "type": "RawMustacheTag",
            "expression": { "type": "UnaryExpression", "operator": "!", "argument": ident("x") }
        }));
        assert_eq!(out, "{{ (not x)|raw }}");
    }

    #[test]
    fn test_each_with_array_pattern() {
        let entries = json!({
            "type": "CallExpression",
            "callee": { "type": "MemberExpression", "object": ident("Object"),
                        "property": ident("entries"), "computed": false },
            "arguments": [ident("obj")]
        });
        let (out, _) = render(json!({
            "type": "EachBlock",
            "expression": entries,
            "context": { "type": "ArrayPattern", "elements": [ident("a"), ident("b")] },
            "children": [mustache(ident("a"))]
        }));
        assert_eq!(out, "{% for a, b in obj %}{{ a }}{% endfor %}");
    }

    #[test]
    fn test_each_with_identifier_context() {
        let (out, _) = render(json!({
            "type": "EachBlock",
            "expression": ident("items"),
            "context": ident("item"),
            "index": "i",
            "children": [mustache(ident("item"))],
            "else": { "children": [text("none")] }
        }));
        assert_eq!(
            out,
            "{% for items_item in items %}{% set item = items_item %}{% set i = loop.index0 %}{{ item }}{% else %}none{% endfor %}"
        );
    }

    #[test]
    fn test_each_with_object_pattern() {
        let (out, _) = render(json!({
            "type": "EachBlock",
            "expression": { "type": "MemberExpression", "object": ident("data"),
                            "property": ident("rows"), "computed": false },
            "context": { "type": "ObjectPattern", "properties": [
                { "type": "Property", "key": ident("id"), "value": ident("id") },
                { "type": "Property", "key": ident("label"), "value": {
                    "type": "AssignmentPattern", "left": ident("label"),
                    "right": { "type": "Literal", "value": "?" } } }
            ] },
            "children": []
        }));
        assert_eq!(
            out,
            "{% for data_rows_item in data.rows %}{% set id = data_rows_item.id %}{% set label = data_rows_item.label|default('?') %}{% endfor %}"
        );
    }

    #[test]
    fn test_each_with_nested_pattern_is_dropped() {
        let (out, diagnostics) = render(json!({
            "type": "EachBlock",
            "expression": ident("rows"),
            "context": { "type": "ArrayPattern", "elements": [
                ident("a"),
                { "type": "ArrayPattern", "elements": [ident("b")] }
            ] },
            "children": [text("x")]
        }));
        assert_eq!(out, "");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::NodeTranslation);
    }

    #[test]
    fn test_slots() {
        let (out, diagnostics) = render(json!({
            "type": "Slot",
            "attributes": [{ "type": "Attribute", "name": "name", "value": [text("header")] }],
            "children": [text("Title")]
        }));
        assert_eq!(out, "{% block header %}Title{% endblock %}");
        assert!(diagnostics.is_empty());

        let (out, diagnostics) = render(json!({ "type": "Slot", "attributes": [], "children": [] }));
        assert_eq!(out, "{% block content %}{% endblock %}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::SlotNameFallback);
    }

    #[test]
    fn test_inline_component_include() {
        let (out, _) = render(json!({
            "type": "InlineComponent", "name": "My-Widget",
            "attributes": [{ "type": "Attribute", "name": "title", "value": [text("Hi")] }],
            "children": [text("\n  ")]
        }));
        assert_eq!(out, "{% include 'mytheme:my-widget' with { title: 'Hi' } only %}");

        let (out, _) = render(json!({
            "type": "InlineComponent", "name": "Icon", "attributes": [], "children": []
        }));
        assert_eq!(out, "{% include 'mytheme:icon' only %}");
    }

    #[test]
    fn test_inline_component_embed() {
        let (out, _) = render(json!({
            "type": "InlineComponent", "name": "Card",
            "attributes": [{ "type": "Attribute", "name": "open", "value": true }],
            "children": [{ "type": "Element", "name": "p", "attributes": [], "children": [text("Body")] }]
        }));
        assert_eq!(
            out,
            "{% embed 'mytheme:card' with { open: true } only %}{% block content %}<p>Body</p>{% endblock %}{% endembed %}"
        );
    }

    #[test]
    fn test_fault_is_isolated_to_node() {
        let (out, diagnostics) = render(json!({
            "type": "Element", "name": "p", "attributes": [],
            "children": [
                text("a"),
                mustache(json!({ "type": "UnaryExpression", "operator": "typeof", "argument": ident("x") })),
                text("b"),
                { "type": "AwaitBlock" }
            ]
        }));
        assert_eq!(out, "<p>ab</p>");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("typeof"));
    }

    #[test]
    fn test_comment() {
        let (out, _) = render(json!({ "type": "Comment", "data": " note " }));
        assert_eq!(out, "{# note #}");
    }
}
