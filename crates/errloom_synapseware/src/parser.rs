//! Synapseware parser.
//!
//! Text is literal except inside `<|` ... `|>` markers. The first token of a
//! marker selects what it means:
//!
//! - `o_o`, `@_@`, `^_^` switch the ego to user, assistant or the default
//!   system voice. Followed by a `<>tag` token, or suffixed with `:target`,
//!   the marker also requests a sample.
//! - `+++` breaks the context.
//! - An identifier interpolates a variable, or invokes a class when it starts
//!   with an upper-case letter, carries arguments, or has a `target:` prefix.

use crate::span::{BindingKey, ClassSpan, EgoSpan, SampleSpan, Span, TextSpan, VarSpan};
use errloom_core::Ego;
use errloom_error::{ErrloomResult, ParseError, ParseErrorKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, instrument, trace};

/// Opening marker delimiter.
pub const MARKER_OPEN: &str = "<|";
/// Closing marker delimiter.
pub const MARKER_CLOSE: &str = "|>";

const USER_SIGIL: &str = "o_o";
const ASSISTANT_SIGIL: &str = "@_@";
const SYSTEM_SIGIL: &str = "^_^";
const CONTEXT_BREAK_SIGIL: &str = "+++";
const TAG_PREFIX: &str = "<>";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
});

/// Whether `name` is a valid synapseware identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Parsed program state threaded through marker parsing.
struct SpanSink {
    spans: Vec<Span>,
    next_binding: usize,
}

impl SpanSink {
    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.spans.push(Span::Text(TextSpan::new(text)));
        }
    }

    fn next_key(&mut self) -> BindingKey {
        let key = BindingKey::new(self.next_binding);
        self.next_binding += 1;
        key
    }
}

/// Parse synapseware text into an ordered span sequence.
///
/// Returns the spans and the number of class spans (binding keys handed out).
///
/// # Errors
///
/// Returns a [`ParseError`] with the byte offset of the offending marker when
/// a marker is unterminated, empty, or unrecognized.
#[instrument(skip(source), fields(len = source.len()))]
pub fn parse_spans(source: &str) -> ErrloomResult<(Vec<Span>, usize)> {
    let mut sink = SpanSink {
        spans: Vec::new(),
        next_binding: 0,
    };
    let mut cursor = 0;

    while let Some(relative) = source[cursor..].find(MARKER_OPEN) {
        let open = cursor + relative;
        sink.push_text(&source[cursor..open]);

        let body_start = open + MARKER_OPEN.len();
        let Some(close_relative) = source[body_start..].find(MARKER_CLOSE) else {
            return Err(ParseError::new(ParseErrorKind::UnterminatedMarker, open).into());
        };
        let close = body_start + close_relative;
        let body = &source[body_start..close];
        if body.contains(MARKER_OPEN) {
            return Err(ParseError::new(ParseErrorKind::UnterminatedMarker, open).into());
        }

        trace!(offset = open, body, "Parsing marker");
        parse_marker(body, open, &mut sink)?;
        cursor = close + MARKER_CLOSE.len();
    }
    sink.push_text(&source[cursor..]);

    debug!(
        spans = sink.spans.len(),
        bindings = sink.next_binding,
        "Parsed synapseware"
    );
    Ok((sink.spans, sink.next_binding))
}

fn parse_marker(body: &str, offset: usize, sink: &mut SpanSink) -> ErrloomResult<()> {
    let mut tokens = body.split_whitespace();
    let Some(head) = tokens.next() else {
        return Err(ParseError::new(ParseErrorKind::EmptyMarker, offset).into());
    };
    let rest: Vec<&str> = tokens.collect();

    if head == CONTEXT_BREAK_SIGIL {
        if !rest.is_empty() {
            return Err(
                ParseError::new(ParseErrorKind::UnknownSigil(body.trim().to_string()), offset)
                    .into(),
            );
        }
        sink.spans.push(Span::ContextBreak);
        return Ok(());
    }

    let (target, name) = match head.split_once(':') {
        Some((left, right)) => (Some(left), right),
        None => (None, head),
    };

    // Role sigils put the target on the right: `@_@:target`.
    if let Some(ego) = ego_for_sigil(target.unwrap_or(name)) {
        let assign = target.map(|_| name);
        return parse_role_marker(ego, assign, &rest, body, offset, sink);
    }

    if !is_identifier(name) {
        let kind = if name.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            ParseErrorKind::InvalidIdentifier(name.to_string())
        } else {
            ParseErrorKind::UnknownSigil(head.to_string())
        };
        return Err(ParseError::new(kind, offset).into());
    }
    if let Some(target) = target
        && !is_identifier(target)
    {
        return Err(
            ParseError::new(ParseErrorKind::InvalidIdentifier(target.to_string()), offset).into(),
        );
    }

    let (positional_args, named_args) = parse_arguments(&rest, offset)?;
    let is_class = target.is_some()
        || !positional_args.is_empty()
        || !named_args.is_empty()
        || name.starts_with(|c: char| c.is_ascii_uppercase());

    if is_class {
        let key = sink.next_key();
        sink.spans.push(Span::Class(ClassSpan::new(
            name,
            positional_args,
            named_args,
            target.map(str::to_string),
            key,
        )));
    } else {
        sink.spans.push(Span::Var(VarSpan::new(name)));
    }
    Ok(())
}

fn ego_for_sigil(sigil: &str) -> Option<Ego> {
    match sigil {
        USER_SIGIL => Some(Ego::user()),
        ASSISTANT_SIGIL => Some(Ego::assistant()),
        SYSTEM_SIGIL => Some(Ego::system()),
        _ => None,
    }
}

fn parse_role_marker(
    ego: Ego,
    assign: Option<&str>,
    rest: &[&str],
    body: &str,
    offset: usize,
    sink: &mut SpanSink,
) -> ErrloomResult<()> {
    let malformed = || {
        ParseError::new(
            ParseErrorKind::MalformedSample(body.trim().to_string()),
            offset,
        )
    };

    if let Some(assign) = assign
        && !is_identifier(assign)
    {
        return Err(if assign.is_empty() {
            malformed().into()
        } else {
            ParseError::new(ParseErrorKind::InvalidIdentifier(assign.to_string()), offset).into()
        });
    }

    let tag = match rest {
        [] => None,
        [token] => {
            let Some(tag) = token.strip_prefix(TAG_PREFIX) else {
                return Err(malformed().into());
            };
            if !tag.is_empty() && !is_identifier(tag) {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidIdentifier(tag.to_string()), offset)
                        .into(),
                );
            }
            Some(tag)
        }
        _ => return Err(malformed().into()),
    };

    sink.spans.push(Span::Ego(EgoSpan::new(ego)));
    if assign.is_some() || tag.is_some() {
        let tag = tag.filter(|t| !t.is_empty()).map(str::to_string);
        sink.spans.push(Span::Sample(SampleSpan::new(
            tag,
            assign.map(str::to_string),
        )));
    }
    Ok(())
}

fn parse_arguments(
    tokens: &[&str],
    offset: usize,
) -> ErrloomResult<(Vec<String>, BTreeMap<String, String>)> {
    let mut positional = Vec::new();
    let mut named = BTreeMap::new();

    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) => {
                if !is_identifier(key) || value.is_empty() {
                    return Err(ParseError::new(
                        ParseErrorKind::MalformedArgument(token.to_string()),
                        offset,
                    )
                    .into());
                }
                if named.insert(key.to_string(), value.to_string()).is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::DuplicateArgument(key.to_string()),
                        offset,
                    )
                    .into());
                }
            }
            None => {
                if !named.is_empty() {
                    return Err(ParseError::new(
                        ParseErrorKind::PositionalAfterNamed(token.to_string()),
                        offset,
                    )
                    .into());
                }
                positional.push(token.to_string());
            }
        }
    }

    Ok((positional, named))
}
