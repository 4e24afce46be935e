//! Tests for synapseware parsing.

use errloom_core::Ego;
use errloom_error::{ErrloomError, ErrloomErrorKind, ParseErrorKind};
use errloom_synapseware::{BindingKey, Span, Synapseware};

fn parse(code: &str) -> Synapseware {
    Synapseware::parse(code).expect("Failed to parse synapseware")
}

fn parse_error(code: &str) -> (ParseErrorKind, usize) {
    let err: ErrloomError = Synapseware::parse(code).expect_err("expected a parse error");
    match err.into_kind() {
        ErrloomErrorKind::Parse(e) => (e.kind, e.offset),
        other => panic!("expected a parse error, got: {}", other),
    }
}

#[test]
fn test_plain_text_is_single_text_span() {
    let program = parse("Hello, world!");
    assert_eq!(program.spans().len(), 1);
    match &program.spans()[0] {
        Span::Text(text) => assert_eq!(text.text(), "Hello, world!"),
        other => panic!("unexpected span: {}", other),
    }
}

#[test]
fn test_empty_source_has_no_spans() {
    assert!(parse("").is_empty());
}

#[test]
fn test_role_markers() {
    let program = parse("<|o_o|>User message.<|@_@|>Assistant response.<|^_^|>Rules.");
    let egos: Vec<&Ego> = program
        .spans()
        .iter()
        .filter_map(|span| match span {
            Span::Ego(ego) => Some(ego.ego()),
            _ => None,
        })
        .collect();
    assert_eq!(egos, vec![&Ego::user(), &Ego::assistant(), &Ego::system()]);
    assert_eq!(program.spans().len(), 6);
}

#[test]
fn test_context_break() {
    let program = parse("A<|+++|>B");
    assert!(matches!(program.spans()[1], Span::ContextBreak));
}

#[test]
fn test_lowercase_identifier_is_variable() {
    let program = parse("<|o_o|>Value is <|my_var|>.");
    match &program.spans()[2] {
        Span::Var(var) => assert_eq!(var.name(), "my_var"),
        other => panic!("unexpected span: {}", other),
    }
    assert_eq!(program.binding_count(), 0);
}

#[test]
fn test_uppercase_identifier_is_class() {
    let program = parse("<|o_o|><|SynapseTest|>");
    match &program.spans()[1] {
        Span::Class(class) => {
            assert_eq!(class.name(), "SynapseTest");
            assert!(class.positional_args().is_empty());
            assert!(class.named_args().is_empty());
            assert_eq!(*class.binding_key(), BindingKey::new(0));
        }
        other => panic!("unexpected span: {}", other),
    }
}

#[test]
fn test_class_arguments() {
    let program = parse("<|SynapseTest karg1 karg2 key1=val1 key2=val2|>");
    let Span::Class(class) = &program.spans()[0] else {
        panic!("expected class span");
    };
    assert_eq!(class.positional_args(), &vec!["karg1".to_string(), "karg2".to_string()]);
    assert_eq!(class.named_args().len(), 2);
    assert_eq!(class.named_args()["key1"], "val1");
    assert_eq!(class.named_args()["key2"], "val2");
    assert!(class.assign_name().is_none());
}

#[test]
fn test_lowercase_identifier_with_arguments_is_class() {
    let program = parse("<|summarize short|>");
    assert!(matches!(program.spans()[0], Span::Class(_)));
}

#[test]
fn test_class_assignment_target() {
    let program = parse("<|summary:Summarizer length=short|>");
    let Span::Class(class) = &program.spans()[0] else {
        panic!("expected class span");
    };
    assert_eq!(class.name(), "Summarizer");
    assert_eq!(class.assign_name().as_deref(), Some("summary"));
}

#[test]
fn test_binding_keys_follow_source_order() {
    let program = parse("<|First|> <|x|> <|Second a|> <|First|>");
    let keys: Vec<BindingKey> = program
        .spans()
        .iter()
        .filter_map(|span| match span {
            Span::Class(class) => Some(*class.binding_key()),
            _ => None,
        })
        .collect();
    assert_eq!(
        keys,
        vec![BindingKey::new(0), BindingKey::new(1), BindingKey::new(2)]
    );
    assert_eq!(program.binding_count(), 3);
}

#[test]
fn test_tagged_sample() {
    let program = parse("<|@_@ <>test|>");
    assert_eq!(program.spans().len(), 2);
    match (&program.spans()[0], &program.spans()[1]) {
        (Span::Ego(ego), Span::Sample(sample)) => {
            assert_eq!(ego.ego(), &Ego::assistant());
            assert_eq!(sample.tag().as_deref(), Some("test"));
            assert!(sample.assign_name().is_none());
        }
        other => panic!("unexpected spans: {:?}", other),
    }
}

#[test]
fn test_assigned_sample() {
    let program = parse("<|@_@:compressed <>compress|>");
    let Span::Sample(sample) = &program.spans()[1] else {
        panic!("expected sample span");
    };
    assert_eq!(sample.tag().as_deref(), Some("compress"));
    assert_eq!(sample.assign_name().as_deref(), Some("compressed"));
}

#[test]
fn test_untagged_samples() {
    let program = parse("<|@_@:reply|>");
    let Span::Sample(sample) = &program.spans()[1] else {
        panic!("expected sample span");
    };
    assert!(sample.tag().is_none());
    assert_eq!(sample.assign_name().as_deref(), Some("reply"));

    let program = parse("<|@_@ <>|>");
    let Span::Sample(sample) = &program.spans()[1] else {
        panic!("expected sample span");
    };
    assert!(sample.tag().is_none());
    assert!(sample.assign_name().is_none());
}

#[test]
fn test_user_sample() {
    let program = parse("<|o_o <>question|>");
    assert!(matches!(&program.spans()[0], Span::Ego(ego) if ego.ego() == &Ego::user()));
    assert!(matches!(program.spans()[1], Span::Sample(_)));
}

#[test]
fn test_whitespace_inside_markers_is_ignored() {
    assert_eq!(parse("<| o_o |>"), parse("<|o_o|>"));
    assert_eq!(parse("<|  SynapseTest   a  |>"), parse("<|SynapseTest a|>"));
}

#[test]
fn test_stray_closing_delimiter_is_literal() {
    let program = parse("a |> b");
    assert_eq!(program.spans().len(), 1);
}

#[test]
fn test_unterminated_marker_reports_offset() {
    let (kind, offset) = parse_error("Hello <|o_o");
    assert_eq!(kind, ParseErrorKind::UnterminatedMarker);
    assert_eq!(offset, 6);
}

#[test]
fn test_nested_marker_is_unterminated() {
    let (kind, offset) = parse_error("<|foo <|bar|>");
    assert_eq!(kind, ParseErrorKind::UnterminatedMarker);
    assert_eq!(offset, 0);
}

#[test]
fn test_empty_marker() {
    let (kind, offset) = parse_error("ab<|  |>");
    assert_eq!(kind, ParseErrorKind::EmptyMarker);
    assert_eq!(offset, 2);
}

#[test]
fn test_unknown_sigil() {
    let (kind, _) = parse_error("<|%%|>");
    assert_eq!(kind, ParseErrorKind::UnknownSigil("%%".to_string()));

    let (kind, _) = parse_error("<|+++ extra|>");
    assert!(matches!(kind, ParseErrorKind::UnknownSigil(_)));
}

#[test]
fn test_invalid_identifier() {
    let (kind, _) = parse_error("<|9lives|>");
    assert_eq!(kind, ParseErrorKind::InvalidIdentifier("9lives".to_string()));

    let (kind, _) = parse_error("<|bad-target:Thing|>");
    assert_eq!(kind, ParseErrorKind::InvalidIdentifier("bad-target".to_string()));
}

#[test]
fn test_positional_after_named() {
    let (kind, _) = parse_error("<|Thing key=value stray|>");
    assert_eq!(kind, ParseErrorKind::PositionalAfterNamed("stray".to_string()));
}

#[test]
fn test_malformed_arguments() {
    let (kind, _) = parse_error("<|Thing =value|>");
    assert_eq!(kind, ParseErrorKind::MalformedArgument("=value".to_string()));

    let (kind, _) = parse_error("<|Thing key=|>");
    assert_eq!(kind, ParseErrorKind::MalformedArgument("key=".to_string()));
}

#[test]
fn test_duplicate_named_argument() {
    let (kind, offset) = parse_error("ab<|Thing k=1 k=2|>");
    assert_eq!(kind, ParseErrorKind::DuplicateArgument("k".to_string()));
    assert_eq!(offset, 2);

    let program = parse("<|Thing k=1 j=2|>");
    let Span::Class(class) = &program.spans()[0] else {
        panic!("expected class span");
    };
    assert_eq!(class.named_args().len(), 2);
}

#[test]
fn test_malformed_sample() {
    let (kind, _) = parse_error("<|@_@ test|>");
    assert!(matches!(kind, ParseErrorKind::MalformedSample(_)));

    let (kind, _) = parse_error("<|@_@ <>a <>b|>");
    assert!(matches!(kind, ParseErrorKind::MalformedSample(_)));

    let (kind, _) = parse_error("<|@_@:|>");
    assert!(matches!(kind, ParseErrorKind::MalformedSample(_)));
}

#[test]
fn test_parse_is_deterministic() {
    let code = "<|+++|><|o_o|>Source.\n<|@_@:compressed <>compress|><|+++|><|Tool a k=v|>";
    assert_eq!(parse(code), parse(code));
}

#[test]
fn test_from_str_and_display() {
    let program: Synapseware = "<|o_o|>Hi <|name|><|r:Tool a k=v|><|@_@:out <>answer|>"
        .parse()
        .expect("valid synapseware");
    let listing = program.to_string();

    assert!(listing.contains("Ego(user)"));
    assert!(listing.contains("Text(\"Hi \")"));
    assert!(listing.contains("Var(name)"));
    assert!(listing.contains("Class(#0 r:Tool a k=v)"));
    assert!(listing.contains("Sample(<answer> -> out)"));
}

#[test]
fn test_program_identity() {
    let first = parse("<|Tool|>");
    let second = parse("<|Tool|>");
    assert_eq!(first, second);
    assert_ne!(first.id(), second.id());
    assert_eq!(first.clone().id(), first.id());

    let json = serde_json::to_string(&first).expect("serializes");
    let restored: Synapseware = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(restored, first);
    assert_ne!(restored.id(), first.id());
}
