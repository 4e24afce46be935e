//! Tests for tapestry projections and bookkeeping.

use errloom_core::{ChatMessage, Ego, Fragment, FragmentKind, Tapestry};
use serde_json::json;

fn conversation() -> Tapestry {
    let mut tapestry = Tapestry::default();
    tapestry.new_context();
    tapestry.add_frozen(Ego::system(), "You are terse.");
    tapestry.add_frozen(Ego::user(), "Foo1");
    tapestry.add_frozen(Ego::assistant(), "Bar2");
    tapestry.new_context();
    tapestry.add_frozen(Ego::system(), "This remains a test scenario.");
    tapestry.add_frozen(Ego::user(), "Foo1");
    tapestry.add_frozen(Ego::user(), " and more");
    tapestry
}

#[test]
fn test_to_text_concatenates_in_order() {
    let tapestry = conversation();
    assert_eq!(
        tapestry.to_text(),
        "You are terse.Foo1Bar2This remains a test scenario.Foo1 and more"
    );
}

#[test]
fn test_to_chat_merges_same_role_within_context() {
    let tapestry = conversation();
    let chat = tapestry.to_chat();

    assert_eq!(chat.len(), 5);
    assert_eq!(chat[0], ChatMessage::new("system", "You are terse."));
    assert_eq!(chat[1], ChatMessage::new("user", "Foo1"));
    assert_eq!(chat[2], ChatMessage::new("assistant", "Bar2"));
    assert_eq!(chat[3].role(), "system");
    assert_eq!(chat[4], ChatMessage::new("user", "Foo1 and more"));
}

#[test]
fn test_to_chat_does_not_merge_across_contexts() {
    let mut tapestry = Tapestry::default();
    tapestry.add_frozen(Ego::user(), "first");
    tapestry.new_context();
    tapestry.add_frozen(Ego::user(), "second");

    let chat = tapestry.to_chat();
    assert_eq!(chat.len(), 2);
    assert_eq!(chat[0].content(), "first");
    assert_eq!(chat[1].content(), "second");
}

#[test]
fn test_context_to_chat_projects_single_context() {
    let tapestry = conversation();
    let second = tapestry.context_to_chat(1).expect("second context exists");
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].content(), "Foo1 and more");
    assert!(tapestry.context_to_chat(7).is_none());
}

#[test]
fn test_projections_are_idempotent() {
    let tapestry = conversation();
    assert_eq!(tapestry.to_text(), tapestry.to_text());
    assert_eq!(tapestry.to_chat(), tapestry.to_chat());
}

#[test]
fn test_add_frozen_creates_context_when_missing() {
    let mut tapestry = Tapestry::default();
    assert!(tapestry.contexts().is_empty());

    tapestry.add_frozen("critic", "Looks fine.");
    assert_eq!(tapestry.contexts().len(), 1);
    let fragment = &tapestry.contexts()[0].fragments()[0];
    assert_eq!(fragment.ego(), &Ego::named("critic"));
    assert_eq!(*fragment.kind(), FragmentKind::Frozen);
}

#[test]
fn test_record_sample_is_independent_of_fragments() {
    let mut tapestry = Tapestry::default();
    tapestry.record_sample(Ego::assistant(), "generated");

    assert_eq!(tapestry.fragment_count(), 0);
    let sample = tapestry.last_sample().expect("sample recorded");
    assert_eq!(sample.role(), &Ego::assistant());
    assert_eq!(sample.content(), "generated");
}

#[test]
fn test_builder_sets_metadata() {
    let mut args = serde_json::Map::new();
    args.insert("temperature".to_string(), json!(0.0));

    let tapestry = Tapestry::builder()
        .row(json!({"id": "test_row"}))
        .sampling_args(args)
        .build()
        .expect("builder has defaults");

    assert_eq!(tapestry.row()["id"], "test_row");
    assert_eq!(tapestry.sampling_args()["temperature"], json!(0.0));
    assert!(tapestry.contexts().is_empty());
}

#[test]
fn test_sampled_fragments_and_display() {
    let mut tapestry = Tapestry::default();
    tapestry.add_frozen(Ego::assistant(), "<answer>");
    tapestry.add_fragment(Fragment::sampled(Ego::assistant(), "42</answer>"));
    tapestry.record_sample(Ego::assistant(), "42");

    let sampled: Vec<_> = tapestry.sampled_fragments().collect();
    assert_eq!(sampled.len(), 1);
    assert_eq!(sampled[0].text(), "42</answer>");

    let rendered = tapestry.to_string();
    assert!(rendered.contains("=== context 0 ==="));
    assert!(rendered.contains("[assistant*] 42</answer>"));
    assert!(rendered.contains("=== samples ==="));
}

#[test]
fn test_json_export_keeps_fragment_kinds() {
    let mut tapestry = Tapestry::default();
    tapestry.add_fragment(Fragment::sampled(Ego::assistant(), "out"));

    let exported = serde_json::to_value(&tapestry).expect("serializes");
    assert_eq!(exported["contexts"][0]["fragments"][0]["kind"], "sampled");
    assert_eq!(exported["contexts"][0]["fragments"][0]["ego"], "assistant");

    let restored: Tapestry = serde_json::from_value(exported).expect("deserializes");
    assert_eq!(restored, tapestry);
}

#[test]
fn test_fragment_kind_display() {
    assert_eq!(FragmentKind::Frozen.to_string(), "frozen");
    assert_eq!(FragmentKind::Sampled.to_string(), "sampled");
    assert_eq!(FragmentKind::default(), FragmentKind::Frozen);
}

#[test]
fn test_system_name_merges_with_default_ego() {
    assert_eq!(Ego::from("system"), Ego::system());
    assert_eq!(Ego::from(Some("system")), Ego::system());
    assert!(Ego::named("system").is_system());

    let mut tapestry = Tapestry::default();
    tapestry.add_frozen(Ego::system(), "A");
    tapestry.add_frozen("system", "B");

    let chat = tapestry.to_chat();
    assert_eq!(chat, vec![ChatMessage::new("system", "AB")]);

    let restored: Ego = serde_json::from_value(json!("system")).expect("deserializes");
    assert_eq!(restored, Ego::system());
}
