//! Synapseware parse error types.

/// Specific error conditions raised while parsing synapseware text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A `<|` marker was opened but never closed with `|>`
    UnterminatedMarker,
    /// A marker with nothing between its delimiters
    EmptyMarker,
    /// Marker content that matches no known sigil or identifier
    UnknownSigil(String),
    /// A name that is not a valid identifier
    InvalidIdentifier(String),
    /// An argument token that cannot be read (e.g. `=value` or `key=`)
    MalformedArgument(String),
    /// A bare positional argument following a `key=value` argument
    PositionalAfterNamed(String),
    /// The same `key=` given twice in one marker
    DuplicateArgument(String),
    /// A role marker carrying an unreadable sample directive
    MalformedSample(String),
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::UnterminatedMarker => write!(f, "Unterminated marker, expected '|>'"),
            ParseErrorKind::EmptyMarker => write!(f, "Empty marker"),
            ParseErrorKind::UnknownSigil(sigil) => write!(f, "Unknown sigil '{}'", sigil),
            ParseErrorKind::InvalidIdentifier(name) => {
                write!(f, "'{}' is not a valid identifier", name)
            }
            ParseErrorKind::MalformedArgument(arg) => write!(f, "Malformed argument '{}'", arg),
            ParseErrorKind::PositionalAfterNamed(arg) => write!(
                f,
                "Positional argument '{}' appears after a named argument",
                arg
            ),
            ParseErrorKind::DuplicateArgument(key) => {
                write!(f, "Argument '{}' given more than once", key)
            }
            ParseErrorKind::MalformedSample(body) => {
                write!(f, "Malformed sample directive '{}'", body)
            }
        }
    }
}

/// Error raised when synapseware text cannot be parsed.
///
/// Carries the byte offset in the source text where the offending marker
/// begins.
///
/// # Examples
///
/// ```
/// use errloom_error::{ParseError, ParseErrorKind};
///
/// let err = ParseError::new(ParseErrorKind::UnterminatedMarker, 12);
/// assert_eq!(err.offset, 12);
/// assert!(format!("{}", err).contains("offset 12"));
/// ```
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The specific error condition
    pub kind: ParseErrorKind,
    /// Byte offset in the source text
    pub offset: usize,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ParseError {
    /// Create a new ParseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            offset,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse Error: {} at offset {} (line {} in {})",
            self.kind, self.offset, self.line, self.file
        )
    }
}

impl std::error::Error for ParseError {}
