//! The expression visitor shared by template mode and value mode.
//!
//! Both writers implement [`ExpressionTranslator`]; the provided
//! [`ExpressionTranslator::expression`] method owns the dispatch over
//! [`Expression`] and the per-node fault boundary, so a node that fails to
//! translate becomes an empty fragment plus a diagnostic and never aborts its
//! siblings.

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use svelte_ast::{
    ArrayExpression, BinaryExpression, CallExpression, ConditionalExpression, Expression,
    Identifier, Literal, LiteralValue, LogicalExpression, MemberExpression, ObjectExpression,
    Span, SpreadElement, TemplateLiteral, TemplateSegment, UnaryExpression,
};
use thiserror::Error;

/// The outcome of translating one node.
pub type Translation = Result<String, TranslateError>;

/// Why a node produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The node is supported but this instance cannot be expressed in Twig.
    #[error("cannot translate {kind}: {message}")]
    NodeTranslation {
        /// The node kind.
        kind: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A recognized construct with no Twig rendering; dropped silently.
    #[error("unsupported construct: {0}")]
    Unsupported(&'static str),
}

impl TranslateError {
    /// Creates a node translation fault.
    pub fn node(kind: &'static str, message: impl Into<String>) -> Self {
        TranslateError::NodeTranslation {
            kind,
            message: message.into(),
        }
    }
}

/// Turns a node's translation into text, reporting faults through `report`.
pub(crate) fn settle(result: Translation, span: Span, report: impl FnOnce(Diagnostic)) -> String {
    match result {
        Ok(text) => text,
        Err(TranslateError::Unsupported(_)) => String::new(),
        Err(error) => {
            report(Diagnostic::new(
                DiagnosticCode::NodeTranslation,
                format!("{error} (node at {span} dropped)"),
                span,
            ));
            String::new()
        }
    }
}

/// A visitor over expression nodes producing Twig text.
pub trait ExpressionTranslator {
    /// Records a diagnostic in the injected sink.
    fn report(&mut self, diagnostic: Diagnostic);

    /// Translates an identifier.
    fn identifier(&mut self, node: &Identifier) -> Translation;
    /// Translates a literal.
    fn literal(&mut self, node: &Literal) -> Translation;
    /// Translates a binary expression.
    fn binary(&mut self, node: &BinaryExpression) -> Translation;
    /// Translates `&&`, `||` and `??`.
    fn logical(&mut self, node: &LogicalExpression) -> Translation;
    /// Translates a ternary.
    fn conditional(&mut self, node: &ConditionalExpression) -> Translation;
    /// Translates a unary expression.
    fn unary(&mut self, node: &UnaryExpression) -> Translation;
    /// Translates a call.
    fn call(&mut self, node: &CallExpression) -> Translation;
    /// Translates a member access.
    fn member(&mut self, node: &MemberExpression) -> Translation;
    /// Translates an array literal.
    fn array(&mut self, node: &ArrayExpression) -> Translation;
    /// Translates an object literal.
    fn object(&mut self, node: &ObjectExpression) -> Translation;
    /// Translates a spread element in an argument list.
    fn spread(&mut self, node: &SpreadElement) -> Translation;
    /// Translates a template literal in expression position.
    fn template_literal(&mut self, node: &TemplateLiteral) -> Translation;

    /// Translates any expression, isolating faults to this node.
    fn expression(&mut self, expr: &Expression) -> String {
        let result = match expr {
            Expression::Identifier(node) => self.identifier(node),
            Expression::Literal(node) => self.literal(node),
            Expression::Binary(node) => self.binary(node),
            Expression::Logical(node) => self.logical(node),
            Expression::Conditional(node) => self.conditional(node),
            Expression::Unary(node) => self.unary(node),
            Expression::Call(node) => self.call(node),
            Expression::Member(node) => self.member(node),
            Expression::Chain(node) => Ok(self.expression(&node.expression)),
            Expression::Array(node) => self.array(node),
            Expression::Object(node) => self.object(node),
            Expression::Spread(node) => self.spread(node),
            Expression::TemplateLiteral(node) => self.template_literal(node),
            Expression::Assignment(_) => Err(TranslateError::node(
                "AssignmentExpression",
                "assignments cannot appear inside a Twig expression",
            )),
            Expression::Unknown => Err(TranslateError::Unsupported("expression")),
        };
        settle(result, expr.span(), |d| self.report(d))
    }

    /// Translates an expression that is an operand of a larger one,
    /// parenthesizing compound expressions.
    fn operand(&mut self, expr: &Expression) -> String {
        let text = self.expression(expr);
        if needs_grouping(expr) && !text.is_empty() {
            format!("({text})")
        } else {
            text
        }
    }

    /// Translates an expression that a `|filter` is attached to. Filters bind
    /// tighter than `not` and unary `-`, so those are parenthesized as well.
    fn filter_operand(&mut self, expr: &Expression) -> String {
        let text = self.operand(expr);
        if is_unary(expr) && !text.is_empty() {
            format!("({text})")
        } else {
            text
        }
    }
}

fn is_unary(expr: &Expression) -> bool {
    match expr {
        Expression::Unary(_) => true,
        Expression::Chain(chain) => is_unary(&chain.expression),
        _ => false,
    }
}

/// Returns true for expressions whose Twig rendering must be parenthesized
/// when embedded in another expression.
pub(crate) fn needs_grouping(expr: &Expression) -> bool {
    match expr {
        Expression::Binary(_)
        | Expression::Logical(_)
        | Expression::Conditional(_)
        | Expression::Assignment(_) => true,
        Expression::TemplateLiteral(tl) => tl.segments.len() > 1,
        Expression::Chain(chain) => needs_grouping(&chain.expression),
        _ => false,
    }
}

/// Maps a JavaScript binary operator onto its Twig spelling.
pub(crate) fn binary_operator(operator: &str) -> &str {
    match operator {
        "===" | "==" => "==",
        "!==" | "!=" => "!=",
        other => other,
    }
}

/// Renders a literal. Identical in both modes.
pub(crate) fn literal_text(node: &Literal) -> Translation {
    match node.value() {
        LiteralValue::String(s) => Ok(quote(s)),
        LiteralValue::Number(n) => Ok(n.to_string()),
        LiteralValue::Boolean(b) => Ok(b.to_string()),
        LiteralValue::Null => Ok("null".to_string()),
        LiteralValue::Regex(regex) => Err(TranslateError::node(
            "Literal",
            format!("regular expression /{}/{} has no Twig form", regex.pattern, regex.flags),
        )),
        LiteralValue::BigInt(digits) => Err(TranslateError::node(
            "Literal",
            format!("bigint literal {digits}n has no Twig form"),
        )),
    }
}

/// Renders `object.property` / `object[property]` with operands from `t`.
pub(crate) fn member_text<T: ExpressionTranslator + ?Sized>(
    t: &mut T,
    node: &MemberExpression,
) -> Translation {
    let object = t.operand(&node.object);
    if object.is_empty() {
        return Err(TranslateError::node("MemberExpression", "the object could not be translated"));
    }
    if node.computed {
        let property = t.expression(&node.property);
        return Ok(format!("{object}[{property}]"));
    }
    match node.property.as_identifier() {
        Some(name) => Ok(format!("{object}.{name}")),
        None => Err(TranslateError::node(
            "MemberExpression",
            format!("unexpected {} as a property name", node.property.kind()),
        )),
    }
}

/// Renders a call with operands from `t`. `Object.entries(x)` renders as `x`
/// because a Twig `for k, v in x` loop already walks key/value pairs.
pub(crate) fn call_text<T: ExpressionTranslator + ?Sized>(
    t: &mut T,
    node: &CallExpression,
) -> Translation {
    let arguments: Vec<String> = node.arguments.iter().map(|arg| t.expression(arg)).collect();
    if node.is_object_entries() {
        return Ok(arguments.join(", "));
    }
    let callee = t.operand(&node.callee);
    if callee.is_empty() {
        return Err(TranslateError::node("CallExpression", "the callee could not be translated"));
    }
    Ok(format!("{callee}({})", arguments.join(", ")))
}

/// Joins template literal segments with `~`, static text quoted.
pub(crate) fn concat_text<T: ExpressionTranslator + ?Sized>(
    t: &mut T,
    node: &TemplateLiteral,
) -> Translation {
    let parts: Vec<String> = node
        .segments
        .iter()
        .filter_map(|segment| match segment {
            TemplateSegment::Text(text) => Some(quote(text)),
            TemplateSegment::Expression(expr) => {
                let text = t.operand(expr);
                (!text.is_empty()).then_some(text)
            }
        })
        .collect();

    if parts.is_empty() {
        return Ok("''".to_string());
    }
    Ok(parts.join(" ~ "))
}

/// Quotes a string as a single-quoted Twig literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Returns true if `name` can be used unquoted as a Twig hash key.
pub fn is_plain_key(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Renders a hash key, quoting it when needed.
pub(crate) fn hash_key(name: &str) -> String {
    if is_plain_key(name) {
        name.to_string()
    } else {
        quote(name)
    }
}
