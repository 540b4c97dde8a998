//! Value-mode translation: expressions as Twig inline literals.
//!
//! Value mode is used wherever a translated expression is embedded as data
//! (component arguments, `set` statements, hash members, ternary branches).
//! Twig's hash and array literals accept neither `and`/`or` as value
//! selectors nor JavaScript spread, so this mode rewrites:
//! - `a && b` into the guard `a ? b`
//! - `a || b` into the fallback `a|default(b)`
//! - `{ ...a, b: 1 }` into the left-to-right merge chain `a|merge({ b: 1 })`

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::options::TransformOptions;
use crate::template::TemplateWriter;
use crate::translate::{
    binary_operator, call_text, concat_text, hash_key, literal_text, member_text, quote, settle,
    ExpressionTranslator, TranslateError, Translation,
};
use svelte_ast::{
    ArrayExpression, Attribute, AttributeValue, AttributeValuePart, BinaryExpression,
    CallExpression, ConditionalExpression, Expression, Identifier, Literal, LogicalExpression,
    MemberExpression, ObjectExpression, ObjectMember, Property, SpreadElement, TemplateLiteral,
    UnaryExpression,
};

/// One run of a literal being assembled: consecutive plain entries share a
/// group, every spread stands alone.
enum Group {
    Entries(Vec<String>),
    Spread(String),
}

/// Translates expressions in value mode.
pub struct ValueWriter<'a, S: DiagnosticSink + ?Sized> {
    options: &'a TransformOptions,
    sink: &'a mut S,
}

impl<'a, S: DiagnosticSink + ?Sized> ValueWriter<'a, S> {
    /// Creates a value-mode writer reporting into `sink`.
    pub fn new(options: &'a TransformOptions, sink: &'a mut S) -> Self {
        Self { options, sink }
    }

    /// Renders component attributes as the argument hash of an include or
    /// embed. Returns `None` when there are no arguments.
    pub fn component_arguments(&mut self, attributes: &[Attribute]) -> Option<String> {
        let mut groups = Vec::new();
        for attribute in attributes {
            match attribute {
                Attribute::Normal(attr) => {
                    let value = self.attribute_value(&attr.value);
                    if value.is_empty() {
                        continue;
                    }
                    push_entry(&mut groups, format!("{}: {value}", hash_key(&attr.name)));
                }
                Attribute::Spread(spread) => {
                    let source = self.filter_operand(&spread.expression);
                    if !source.is_empty() {
                        groups.push(Group::Spread(source));
                    }
                }
                Attribute::Unknown => {}
            }
        }

        if groups.is_empty() {
            None
        } else {
            Some(merge_chain(groups, |entries| hash_literal(&entries)))
        }
    }

    /// Renders an attribute value as a single Twig value.
    pub fn attribute_value(&mut self, value: &AttributeValue) -> String {
        let parts = match value {
            AttributeValue::Bool(b) => return b.to_string(),
            AttributeValue::Parts(parts) => parts,
        };

        if let [part] = parts.as_slice() {
            if let Some(expr) = part.expression() {
                return self.expression(expr);
            }
        }

        let pieces: Vec<String> = parts
            .iter()
            .filter_map(|part| match part {
                AttributeValuePart::Text(text) if text.data.is_empty() => None,
                AttributeValuePart::Text(text) => Some(quote(&text.data)),
                other => {
                    let expr = other.expression()?;
                    let text = self.operand(expr);
                    (!text.is_empty()).then_some(text)
                }
            })
            .collect();

        if pieces.is_empty() {
            "''".to_string()
        } else {
            pieces.join(" ~ ")
        }
    }

    fn property(&mut self, node: &Property) -> Translation {
        if node.method {
            return Err(TranslateError::node("Property", "object methods have no Twig form"));
        }

        let key = if node.computed {
            let key = self.expression(&node.key);
            if key.is_empty() {
                return Err(TranslateError::node(
                    "Property",
                    "the computed key could not be translated",
                ));
            }
            format!("({key})")
        } else {
            match &node.key {
                Expression::Identifier(ident) => hash_key(&ident.name),
                Expression::Literal(lit) => match &lit.value {
                    serde_json::Value::String(s) => hash_key(s),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => literal_text(lit)?,
                },
                other => {
                    return Err(TranslateError::node(
                        "Property",
                        format!("unexpected {} as a key", other.kind()),
                    ))
                }
            }
        };

        let value = self.expression(&node.value);
        if value.is_empty() {
            return Err(TranslateError::node(
                "Property",
                format!("the value of `{key}` could not be translated"),
            ));
        }
        Ok(format!("{key}: {value}"))
    }
}

impl<S: DiagnosticSink + ?Sized> ExpressionTranslator for ValueWriter<'_, S> {
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
        match node.operator.as_str() {
            "&&" => {
                let left = self.operand(&node.left);
                Ok(format!("{left} ? {}", self.operand(&node.right)))
            }
            "||" => {
                let left = self.filter_operand(&node.left);
                Ok(format!("{left}|default({})", self.expression(&node.right)))
            }
            "??" => {
                let left = self.operand(&node.left);
                Ok(format!("{left} ?? {}", self.operand(&node.right)))
            }
            other => Err(TranslateError::node(
                "LogicalExpression",
                format!("unknown operator `{other}`"),
            )),
        }
    }

    fn conditional(&mut self, node: &ConditionalExpression) -> Translation {
        // The test is a condition, not a value, so `and`/`or` are fine there.
        let test = TemplateWriter::new(self.options, &mut *self.sink).operand(&node.test);
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
        let mut groups = Vec::new();
        for element in &node.elements {
            match element {
                None => push_entry(&mut groups, "null".to_string()),
                Some(Expression::Spread(spread)) => {
                    let source = self.filter_operand(&spread.argument);
                    if !source.is_empty() {
                        groups.push(Group::Spread(source));
                    }
                }
                Some(expr) => {
                    let text = self.expression(expr);
                    if !text.is_empty() {
                        push_entry(&mut groups, text);
                    }
                }
            }
        }

        if groups.is_empty() {
            return Ok("[]".to_string());
        }
        Ok(merge_chain(groups, |entries| format!("[{}]", entries.join(", "))))
    }

    fn object(&mut self, node: &ObjectExpression) -> Translation {
        let mut groups = Vec::new();
        for member in &node.properties {
            match member {
                ObjectMember::Property(property) => {
                    let entry = self.property(property);
                    let text = settle(entry, property.span, |d| self.sink.report(d));
                    if !text.is_empty() {
                        push_entry(&mut groups, text);
                    }
                }
                ObjectMember::SpreadElement(spread) => {
                    let source = self.filter_operand(&spread.argument);
                    if !source.is_empty() {
                        groups.push(Group::Spread(source));
                    }
                }
            }
        }

        if groups.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(merge_chain(groups, |entries| hash_literal(&entries)))
    }

    fn spread(&mut self, node: &SpreadElement) -> Translation {
        Ok(format!("...{}", self.operand(&node.argument)))
    }

    fn template_literal(&mut self, node: &TemplateLiteral) -> Translation {
        concat_text(self, node)
    }
}

fn push_entry(groups: &mut Vec<Group>, entry: String) {
    if let Some(Group::Entries(entries)) = groups.last_mut() {
        entries.push(entry);
    } else {
        groups.push(Group::Entries(vec![entry]));
    }
}

fn hash_literal(entries: &[String]) -> String {
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    }
}

/// Seeds the chain with the first group and merges every later group into it,
/// so later entries override earlier ones exactly as spread does.
fn merge_chain(groups: Vec<Group>, literal: impl Fn(Vec<String>) -> String) -> String {
    let mut rendered = groups.into_iter().map(|group| match group {
        Group::Entries(entries) => literal(entries),
        Group::Spread(source) => source,
    });

    let mut chain = rendered.next().unwrap_or_default();
    for next in rendered {
        chain.push_str("|merge(");
        chain.push_str(&next);
        chain.push(')');
    }
    chain
}
