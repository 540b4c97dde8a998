//! ESTree expression, pattern and statement types.
//!
//! Only the subset of ESTree that appears in component templates and in the
//! top-level declarations of an instance script is modelled. Every other node
//! kind deserializes to an `Unknown` variant so that a document containing it
//! still loads.

use crate::span::Span;
use serde::Deserialize;
use smol_str::SmolStr;

/// An expression node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// A reference to a binding.
    Identifier(Identifier),
    /// A string, number, boolean, null, regex or bigint literal.
    Literal(Literal),
    /// `a + b`, `a === b`, ...
    #[serde(rename = "BinaryExpression")]
    Binary(BinaryExpression),
    /// `a && b`, `a || b`, `a ?? b`.
    #[serde(rename = "LogicalExpression")]
    Logical(LogicalExpression),
    /// `test ? a : b`.
    #[serde(rename = "ConditionalExpression")]
    Conditional(ConditionalExpression),
    /// `!a`, `-a`, `typeof a`, ...
    #[serde(rename = "UnaryExpression")]
    Unary(UnaryExpression),
    /// `callee(args)`.
    #[serde(rename = "CallExpression")]
    Call(CallExpression),
    /// `object.property` or `object[property]`.
    #[serde(rename = "MemberExpression")]
    Member(MemberExpression),
    /// The wrapper around an optional chain (`a?.b`).
    #[serde(rename = "ChainExpression")]
    Chain(ChainExpression),
    /// `[a, b]`.
    #[serde(rename = "ArrayExpression")]
    Array(ArrayExpression),
    /// `{ a: 1, ...b }`.
    #[serde(rename = "ObjectExpression")]
    Object(ObjectExpression),
    /// `...a` inside an array or call argument list.
    #[serde(rename = "SpreadElement")]
    Spread(SpreadElement),
    /// `` `a${b}` ``.
    TemplateLiteral(TemplateLiteral),
    /// `a = b`.
    #[serde(rename = "AssignmentExpression")]
    Assignment(AssignmentExpression),
    /// Any other expression kind (functions, `new`, `await`, ...).
    #[serde(other)]
    Unknown,
}

impl Expression {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(n) => n.span,
            Expression::Literal(n) => n.span,
            Expression::Binary(n) => n.span,
            Expression::Logical(n) => n.span,
            Expression::Conditional(n) => n.span,
            Expression::Unary(n) => n.span,
            Expression::Call(n) => n.span,
            Expression::Member(n) => n.span,
            Expression::Chain(n) => n.span,
            Expression::Array(n) => n.span,
            Expression::Object(n) => n.span,
            Expression::Spread(n) => n.span,
            Expression::TemplateLiteral(n) => n.span,
            Expression::Assignment(n) => n.span,
            Expression::Unknown => Span::default(),
        }
    }

    /// Returns the ESTree name of this expression kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "Identifier",
            Expression::Literal(_) => "Literal",
            Expression::Binary(_) => "BinaryExpression",
            Expression::Logical(_) => "LogicalExpression",
            Expression::Conditional(_) => "ConditionalExpression",
            Expression::Unary(_) => "UnaryExpression",
            Expression::Call(_) => "CallExpression",
            Expression::Member(_) => "MemberExpression",
            Expression::Chain(_) => "ChainExpression",
            Expression::Array(_) => "ArrayExpression",
            Expression::Object(_) => "ObjectExpression",
            Expression::Spread(_) => "SpreadElement",
            Expression::TemplateLiteral(_) => "TemplateLiteral",
            Expression::Assignment(_) => "AssignmentExpression",
            Expression::Unknown => "Unknown",
        }
    }

    /// Returns the identifier name if this is a plain identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier(ident) => Some(ident.name.as_str()),
            _ => None,
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    /// The span of the identifier.
    #[serde(flatten)]
    pub span: Span,
    /// The identifier name.
    pub name: SmolStr,
}

/// A literal.
#[derive(Debug, Clone, Deserialize)]
pub struct Literal {
    /// The span of the literal.
    #[serde(flatten)]
    pub span: Span,
    /// The runtime value as JSON (`{}` or `null` for regex literals).
    #[serde(default)]
    pub value: serde_json::Value,
    /// The literal as written in the source.
    #[serde(default)]
    pub raw: Option<String>,
    /// Present on regular expression literals.
    #[serde(default)]
    pub regex: Option<RegexLiteral>,
    /// Present on bigint literals (the digits).
    #[serde(default)]
    pub bigint: Option<String>,
}

/// The pattern and flags of a regular expression literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegexLiteral {
    /// The pattern between the slashes.
    pub pattern: String,
    /// The flags after the closing slash.
    #[serde(default)]
    pub flags: String,
}

/// The runtime value of a literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    /// A string literal.
    String(&'a str),
    /// A number literal.
    Number(&'a serde_json::Number),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// A regular expression literal.
    Regex(&'a RegexLiteral),
    /// A bigint literal.
    BigInt(&'a str),
}

impl Literal {
    /// Classifies the literal by its runtime value.
    pub fn value(&self) -> LiteralValue<'_> {
        if let Some(regex) = &self.regex {
            return LiteralValue::Regex(regex);
        }
        if let Some(digits) = &self.bigint {
            return LiteralValue::BigInt(digits);
        }
        match &self.value {
            serde_json::Value::String(s) => LiteralValue::String(s),
            serde_json::Value::Number(n) => LiteralValue::Number(n),
            serde_json::Value::Bool(b) => LiteralValue::Boolean(*b),
            _ => LiteralValue::Null,
        }
    }
}

/// A binary expression.
#[derive(Debug, Clone, Deserialize)]
pub struct BinaryExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The operator as written (`===`, `+`, `in`, ...).
    pub operator: SmolStr,
    /// The left operand.
    pub left: Box<Expression>,
    /// The right operand.
    pub right: Box<Expression>,
}

/// A logical expression.
#[derive(Debug, Clone, Deserialize)]
pub struct LogicalExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// `&&`, `||` or `??`.
    pub operator: SmolStr,
    /// The left operand.
    pub left: Box<Expression>,
    /// The right operand.
    pub right: Box<Expression>,
}

/// A conditional (ternary) expression.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The condition.
    pub test: Box<Expression>,
    /// The value when the condition holds.
    pub consequent: Box<Expression>,
    /// The value otherwise.
    pub alternate: Box<Expression>,
}

/// A unary expression.
#[derive(Debug, Clone, Deserialize)]
pub struct UnaryExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The operator (`!`, `-`, `+`, `typeof`, ...).
    pub operator: SmolStr,
    /// The operand.
    pub argument: Box<Expression>,
}

/// A call expression.
#[derive(Debug, Clone, Deserialize)]
pub struct CallExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The function being called.
    pub callee: Box<Expression>,
    /// The arguments.
    #[serde(default)]
    pub arguments: Vec<Expression>,
    /// Whether this is an optional call (`f?.()`).
    #[serde(default)]
    pub optional: bool,
}

impl CallExpression {
    /// Returns true for `Object.entries(...)`.
    pub fn is_object_entries(&self) -> bool {
        match self.callee.as_ref() {
            Expression::Member(member) => {
                !member.computed
                    && member.object.as_identifier() == Some("Object")
                    && member.property.as_identifier() == Some("entries")
            }
            _ => false,
        }
    }
}

/// A member expression.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The object being accessed.
    pub object: Box<Expression>,
    /// The property (an identifier unless `computed`).
    pub property: Box<Expression>,
    /// Whether the property is accessed with brackets.
    #[serde(default)]
    pub computed: bool,
    /// Whether this link of the chain is optional (`?.`).
    #[serde(default)]
    pub optional: bool,
}

/// The root of an optional chain.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The chained member or call expression.
    pub expression: Box<Expression>,
}

/// An array literal.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The elements; `None` marks a hole (`[a, , b]`).
    #[serde(default)]
    pub elements: Vec<Option<Expression>>,
}

/// An object literal.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// The members in source order.
    #[serde(default)]
    pub properties: Vec<ObjectMember>,
}

/// A member of an object literal.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    /// `key: value`, `key`, `[expr]: value`.
    Property(Property),
    /// `...source`.
    SpreadElement(SpreadElement),
}

/// A property of an object literal.
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    /// The span of the property.
    #[serde(flatten)]
    pub span: Span,
    /// The key: an identifier, a literal, or any expression when `computed`.
    pub key: Expression,
    /// The value.
    pub value: Expression,
    /// Whether the key is written in brackets.
    #[serde(default)]
    pub computed: bool,
    /// Whether the property is written as `{ key }`.
    #[serde(default)]
    pub shorthand: bool,
    /// Whether the property is a method (`{ key() {} }`).
    #[serde(default)]
    pub method: bool,
}

/// A spread element.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadElement {
    /// The span of the element.
    #[serde(flatten)]
    pub span: Span,
    /// The expression being spread.
    pub argument: Box<Expression>,
}

/// An assignment expression.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentExpression {
    /// The span of the expression.
    #[serde(flatten)]
    pub span: Span,
    /// `=`, `+=`, ...
    pub operator: SmolStr,
    /// The assignment target.
    pub left: Box<Pattern>,
    /// The assigned value.
    pub right: Box<Expression>,
}

/// A template literal, with its static and dynamic parts merged into one
/// ordered sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawTemplateLiteral")]
pub struct TemplateLiteral {
    /// The span of the literal.
    pub span: Span,
    /// Text and expression segments ordered by source offset.
    pub segments: Vec<TemplateSegment>,
}

/// One segment of a template literal.
#[derive(Debug, Clone)]
pub enum TemplateSegment {
    /// Static text (the cooked value of a quasi).
    Text(String),
    /// An embedded `${expression}`.
    Expression(Expression),
}

/// A static part of a template literal as emitted by the parser.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateElement {
    /// The span of the quasi.
    #[serde(flatten)]
    pub span: Span,
    /// The raw and cooked text.
    pub value: TemplateElementValue,
    /// Whether this is the last quasi.
    #[serde(default)]
    pub tail: bool,
}

/// The text of a template element.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateElementValue {
    /// The text as written, escapes intact.
    #[serde(default)]
    pub raw: String,
    /// The text with escapes processed; absent for invalid escapes.
    #[serde(default)]
    pub cooked: Option<String>,
}

#[derive(Deserialize)]
struct RawTemplateLiteral {
    #[serde(flatten)]
    span: Span,
    #[serde(default)]
    quasis: Vec<TemplateElement>,
    #[serde(default)]
    expressions: Vec<Expression>,
}

impl From<RawTemplateLiteral> for TemplateLiteral {
    fn from(raw: RawTemplateLiteral) -> Self {
        let mut quasis = raw.quasis.into_iter();
        let mut expressions = raw.expressions.into_iter();
        let mut keyed = Vec::new();

        // Natural interleave first; the stable sort below only moves segments
        // whose recorded offsets disagree with it.
        loop {
            let quasi = quasis.next();
            let expression = expressions.next();
            if quasi.is_none() && expression.is_none() {
                break;
            }
            if let Some(quasi) = quasi {
                let text = quasi.value.cooked.unwrap_or(quasi.value.raw);
                if !text.is_empty() {
                    keyed.push((quasi.span.start, TemplateSegment::Text(text)));
                }
            }
            if let Some(expression) = expression {
                keyed.push((expression.span().start, TemplateSegment::Expression(expression)));
            }
        }
        keyed.sort_by_key(|(start, _)| *start);

        Self {
            span: raw.span,
            segments: keyed.into_iter().map(|(_, segment)| segment).collect(),
        }
    }
}

/// A binding pattern.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// `name`.
    Identifier(Identifier),
    /// `[a, b]`.
    ArrayPattern(ArrayPattern),
    /// `{ a, b: c }`.
    ObjectPattern(ObjectPattern),
    /// `name = default`.
    AssignmentPattern(AssignmentPattern),
    /// `...rest`.
    RestElement(RestElement),
    /// Member targets and anything else.
    #[serde(other)]
    Unknown,
}

impl Pattern {
    /// Returns the ESTree name of this pattern kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::Identifier(_) => "Identifier",
            Pattern::ArrayPattern(_) => "ArrayPattern",
            Pattern::ObjectPattern(_) => "ObjectPattern",
            Pattern::AssignmentPattern(_) => "AssignmentPattern",
            Pattern::RestElement(_) => "RestElement",
            Pattern::Unknown => "Unknown",
        }
    }

    /// Returns the bound name if this pattern is a plain identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Pattern::Identifier(ident) => Some(ident.name.as_str()),
            _ => None,
        }
    }
}

/// An array destructuring pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrayPattern {
    /// The span of the pattern.
    #[serde(flatten)]
    pub span: Span,
    /// The element patterns; `None` marks a skipped position.
    #[serde(default)]
    pub elements: Vec<Option<Pattern>>,
}

/// An object destructuring pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectPattern {
    /// The span of the pattern.
    #[serde(flatten)]
    pub span: Span,
    /// The property patterns.
    #[serde(default)]
    pub properties: Vec<ObjectPatternMember>,
}

/// A member of an object pattern.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectPatternMember {
    /// `key` or `key: pattern`.
    Property(PatternProperty),
    /// `...rest`.
    RestElement(RestElement),
}

/// A property inside an object pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternProperty {
    /// The span of the property.
    #[serde(flatten)]
    pub span: Span,
    /// The property key.
    pub key: Expression,
    /// The binding target.
    pub value: Pattern,
    /// Whether the key is written in brackets.
    #[serde(default)]
    pub computed: bool,
}

/// A pattern with a default value.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentPattern {
    /// The span of the pattern.
    #[serde(flatten)]
    pub span: Span,
    /// The binding target.
    pub left: Box<Pattern>,
    /// The default value.
    pub right: Box<Expression>,
}

/// A rest element inside a pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct RestElement {
    /// The span of the element.
    #[serde(flatten)]
    pub span: Span,
    /// The binding target.
    pub argument: Box<Pattern>,
}

/// A script program.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    /// The span of the program.
    #[serde(flatten)]
    pub span: Span,
    /// The top-level statements.
    #[serde(default)]
    pub body: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// `let a = 1, b;`
    VariableDeclaration(VariableDeclaration),
    /// `export let a = 1;`
    ExportNamedDeclaration(ExportNamedDeclaration),
    /// `$: a = b * 2;`
    LabeledStatement(LabeledStatement),
    /// `a = b;`
    ExpressionStatement(ExpressionStatement),
    /// Imports, functions, classes and everything else.
    #[serde(other)]
    Unknown,
}

/// A variable declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclaration {
    /// The span of the declaration.
    #[serde(flatten)]
    pub span: Span,
    /// `var`, `let` or `const`.
    pub kind: DeclarationKind,
    /// The declarators.
    #[serde(default)]
    pub declarations: Vec<VariableDeclarator>,
}

/// The keyword of a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
    /// `using` and future keywords.
    #[serde(other)]
    Other,
}

/// One `id = init` part of a declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclarator {
    /// The span of the declarator.
    #[serde(flatten)]
    pub span: Span,
    /// The binding pattern.
    pub id: Pattern,
    /// The initializer, if any.
    #[serde(default)]
    pub init: Option<Expression>,
}

/// An `export` of a declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportNamedDeclaration {
    /// The span of the export.
    #[serde(flatten)]
    pub span: Span,
    /// The exported declaration (absent for `export { a, b }`).
    #[serde(default)]
    pub declaration: Option<Box<Statement>>,
}

/// A labeled statement (`$:` reactive declarations).
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledStatement {
    /// The span of the statement.
    #[serde(flatten)]
    pub span: Span,
    /// The label.
    pub label: Identifier,
    /// The labeled body.
    pub body: Box<Statement>,
}

/// An expression used as a statement.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionStatement {
    /// The span of the statement.
    #[serde(flatten)]
    pub span: Span,
    /// The expression.
    pub expression: Expression,
}
