//! AST types for Svelte component templates.
//!
//! This module mirrors the document emitted by the Svelte compiler's `parse()`
//! function: a `html` fragment holding the render tree, plus the optional
//! instance and module scripts.

use crate::estree::{Expression, Pattern, Program};
use crate::span::Span;
use serde::Deserialize;
use smol_str::SmolStr;

/// A complete parsed Svelte component.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SvelteAst {
    /// The template fragment.
    #[serde(default)]
    pub html: Fragment,
    /// The instance script (`<script>`).
    #[serde(default)]
    pub instance: Option<Script>,
    /// The module-level script (`<script context="module">`).
    #[serde(default)]
    pub module: Option<Script>,
}

impl SvelteAst {
    /// Returns the top-level statements of the instance script.
    pub fn instance_body(&self) -> &[crate::estree::Statement] {
        self.instance
            .as_ref()
            .map(|script| script.content.body.as_slice())
            .unwrap_or_default()
    }
}

/// A script block.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// The span of the entire script block including tags.
    #[serde(flatten)]
    pub span: Span,
    /// The script context (`default` or `module`).
    #[serde(default)]
    pub context: SmolStr,
    /// The parsed program.
    #[serde(default)]
    pub content: Program,
}

/// A template fragment containing child nodes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fragment {
    /// The span of the fragment.
    #[serde(flatten)]
    pub span: Span,
    /// The child nodes.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// A node in the template.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateNode {
    /// A nested fragment.
    Fragment(Fragment),
    /// An HTML element.
    Element(Element),
    /// Text content.
    Text(Text),
    /// A comment.
    Comment(Comment),
    /// An expression `{expr}`.
    MustacheTag(MustacheTag),
    /// An `{@html expr}` tag.
    RawMustacheTag(MustacheTag),
    /// An `{#if}` block.
    IfBlock(IfBlock),
    /// An `{#each}` block.
    EachBlock(EachBlock),
    /// A component reference (`<Card />`).
    InlineComponent(InlineComponent),
    /// A `<slot>` outlet.
    Slot(Slot),
    /// Any other node kind (`{#await}`, `<svelte:head>`, `{@const}`, ...).
    #[serde(other)]
    Unknown,
}

impl TemplateNode {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Fragment(n) => n.span,
            TemplateNode::Element(n) => n.span,
            TemplateNode::Text(n) => n.span,
            TemplateNode::Comment(n) => n.span,
            TemplateNode::MustacheTag(n) => n.span,
            TemplateNode::RawMustacheTag(n) => n.span,
            TemplateNode::IfBlock(n) => n.span,
            TemplateNode::EachBlock(n) => n.span,
            TemplateNode::InlineComponent(n) => n.span,
            TemplateNode::Slot(n) => n.span,
            TemplateNode::Unknown => Span::default(),
        }
    }

    /// Returns the name of this node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateNode::Fragment(_) => "Fragment",
            TemplateNode::Element(_) => "Element",
            TemplateNode::Text(_) => "Text",
            TemplateNode::Comment(_) => "Comment",
            TemplateNode::MustacheTag(_) => "MustacheTag",
            TemplateNode::RawMustacheTag(_) => "RawMustacheTag",
            TemplateNode::IfBlock(_) => "IfBlock",
            TemplateNode::EachBlock(_) => "EachBlock",
            TemplateNode::InlineComponent(_) => "InlineComponent",
            TemplateNode::Slot(_) => "Slot",
            TemplateNode::Unknown => "Unknown",
        }
    }
}

/// An HTML element.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    /// The span of the element.
    #[serde(flatten)]
    pub span: Span,
    /// The tag name.
    pub name: SmolStr,
    /// The attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// The child nodes.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// A component reference.
#[derive(Debug, Clone, Deserialize)]
pub struct InlineComponent {
    /// The span of the component.
    #[serde(flatten)]
    pub span: Span,
    /// The component tag name as written (`Card`, `My-Widget`).
    pub name: SmolStr,
    /// The attributes/props.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// The child nodes (default slot content).
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// A `<slot>` element.
#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    /// The span of the slot.
    #[serde(flatten)]
    pub span: Span,
    /// The attributes, including an optional static `name`.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// The fallback content.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

impl Slot {
    /// Returns the value of a static `name="..."` attribute, if present and
    /// non-empty.
    pub fn explicit_name(&self) -> Option<String> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Normal(a) if a.name == "name" => {
                a.static_text().filter(|name| !name.is_empty())
            }
            _ => None,
        })
    }
}

/// Text content.
#[derive(Debug, Clone, Deserialize)]
pub struct Text {
    /// The span of the text.
    #[serde(flatten)]
    pub span: Span,
    /// The decoded text content.
    #[serde(default)]
    pub data: String,
    /// The text as written (entities intact).
    #[serde(default)]
    pub raw: Option<String>,
}

impl Text {
    /// Returns the text as written, falling back to the decoded data.
    pub fn source_text(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.data)
    }
}

/// A comment.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// The span of the comment.
    #[serde(flatten)]
    pub span: Span,
    /// The comment content (without `<!--` and `-->`).
    #[serde(default)]
    pub data: String,
}

/// An expression tag `{expr}` or `{@html expr}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MustacheTag {
    /// The span of the tag.
    #[serde(flatten)]
    pub span: Span,
    /// The expression.
    pub expression: Expression,
}

/// An `{#if}` block.
#[derive(Debug, Clone, Deserialize)]
pub struct IfBlock {
    /// The span of the entire block.
    #[serde(flatten)]
    pub span: Span,
    /// The condition.
    pub expression: Expression,
    /// The consequent branch.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
    /// The `{:else}` branch; an `{:else if}` holds a nested `IfBlock`.
    #[serde(default, rename = "else")]
    pub else_block: Option<ElseBlock>,
    /// Whether this block is the nested half of an `{:else if}`.
    #[serde(default)]
    pub elseif: bool,
}

/// An `{:else}` branch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElseBlock {
    /// The span of the branch.
    #[serde(flatten)]
    pub span: Span,
    /// The branch content.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

/// An `{#each}` block.
#[derive(Debug, Clone, Deserialize)]
pub struct EachBlock {
    /// The span of the entire block.
    #[serde(flatten)]
    pub span: Span,
    /// The expression being iterated.
    pub expression: Expression,
    /// The iteration binding (`as item`, `as [k, v]`, `as { a }`).
    #[serde(default)]
    pub context: Option<Pattern>,
    /// The index binding name.
    #[serde(default)]
    pub index: Option<SmolStr>,
    /// The key expression.
    #[serde(default)]
    pub key: Option<Expression>,
    /// The body of the loop.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
    /// The branch rendered when the list is empty.
    #[serde(default, rename = "else")]
    pub else_block: Option<ElseBlock>,
}

/// An attribute on an element, component or slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Attribute {
    /// A normal attribute `name="value"`, `name={expr}` or `{name}`.
    #[serde(rename = "Attribute")]
    Normal(NormalAttribute),
    /// A spread attribute `{...obj}`.
    Spread(SpreadAttribute),
    /// Directives and event handlers (`on:click`, `bind:value`, `class:x`, ...).
    #[serde(other)]
    Unknown,
}

/// A normal attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalAttribute {
    /// The span of the attribute.
    #[serde(flatten)]
    pub span: Span,
    /// The attribute name.
    pub name: SmolStr,
    /// The attribute value.
    pub value: AttributeValue,
}

impl NormalAttribute {
    /// Returns the value if it consists of text parts only.
    pub fn static_text(&self) -> Option<String> {
        match &self.value {
            AttributeValue::Bool(_) => None,
            AttributeValue::Parts(parts) => parts
                .iter()
                .map(|part| match part {
                    AttributeValuePart::Text(text) => Some(text.data.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// An attribute value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `true` for a bare boolean attribute (`<input disabled>`).
    Bool(bool),
    /// A sequence of text and expression parts.
    Parts(Vec<AttributeValuePart>),
}

impl AttributeValue {
    /// Returns true for a bare boolean attribute.
    pub fn is_true(&self) -> bool {
        matches!(self, AttributeValue::Bool(true))
    }
}

/// A part of an attribute value.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeValuePart {
    /// A text part.
    Text(Text),
    /// An expression part `{expr}`.
    MustacheTag(MustacheTag),
    /// A shorthand `{name}`, equivalent to `name={name}`.
    AttributeShorthand(AttributeShorthand),
}

impl AttributeValuePart {
    /// Returns the expression of a dynamic part.
    pub fn expression(&self) -> Option<&Expression> {
        match self {
            AttributeValuePart::Text(_) => None,
            AttributeValuePart::MustacheTag(tag) => Some(&tag.expression),
            AttributeValuePart::AttributeShorthand(short) => Some(&short.expression),
        }
    }
}

/// A shorthand attribute value.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeShorthand {
    /// The span of the shorthand.
    #[serde(flatten)]
    pub span: Span,
    /// The expression (always an identifier).
    pub expression: Expression,
}

/// A spread attribute `{...obj}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadAttribute {
    /// The span of the attribute.
    #[serde(flatten)]
    pub span: Span,
    /// The expression being spread.
    pub expression: Expression,
}
