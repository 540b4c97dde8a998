//! Diagnostic types and the sink that collects them during translation.

use svelte_ast::Span;

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// The source location.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span,
        }
    }
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A hint or suggestion.
    Hint,
    /// A warning; the output is still produced.
    Warning,
    /// An error; some output could not be produced.
    Error,
}

impl Severity {
    /// Returns the severity as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "Hint",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Diagnostic codes for everything the translator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `node-translation`: a node could not be translated and was dropped
    NodeTranslation,
    /// `slot-name-fallback`: an unnamed slot took the default identifier
    SlotNameFallback,
    /// `unrecognized-initializer`: a prop type was inferred as `string` by fallback
    UnrecognizedInitializer,
    /// `load-error`: the AST document could not be loaded
    LoadError,
    /// `metadata-error`: the metadata document could not be produced
    MetadataError,
    /// `write-error`: the outputs could not be written
    WriteError,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::LoadError
            | DiagnosticCode::MetadataError
            | DiagnosticCode::WriteError => Severity::Error,
            DiagnosticCode::NodeTranslation | DiagnosticCode::SlotNameFallback => {
                Severity::Warning
            }
            DiagnosticCode::UnrecognizedInitializer => Severity::Hint,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::NodeTranslation => "node-translation",
            DiagnosticCode::SlotNameFallback => "slot-name-fallback",
            DiagnosticCode::UnrecognizedInitializer => "unrecognized-initializer",
            DiagnosticCode::LoadError => "load-error",
            DiagnosticCode::MetadataError => "metadata-error",
            DiagnosticCode::WriteError => "write-error",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives diagnostics as translation proceeds.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Adapts a closure into a [`DiagnosticSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(Diagnostic)> DiagnosticSink for FnSink<F> {
    fn report(&mut self, diagnostic: Diagnostic) {
        (self.0)(diagnostic)
    }
}
