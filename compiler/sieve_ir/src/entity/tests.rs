use super::*;
use crate::{Length, NodeKind};
use pretty_assertions::assert_eq;

const TLV: &str = r#"{
  "name": "tlv",
  "root": {
    "kind": "sequence", "rule": "record", "items": [
      { "kind": "field", "name": "type", "spec": { "type": "uint", "width": 1 } },
      { "kind": "field", "name": "length", "spec": { "type": "uint", "width": 2 } },
      { "kind": "field", "name": "value", "spec": { "type": "bytes", "len": "length" },
        "action": "inspect" }
    ]
  }
}"#;

#[test]
fn test_grammar_file_from_json() {
    let file: GrammarFile = serde_json::from_str(TLV).unwrap();
    assert_eq!(file.name, "tlv");

    assert!(file.parsers.is_empty());
    let Some(Entity::Sequence { rule, items }) = &file.root else {
        panic!("expected sequence root, got {:?}", file.root);
    };
    assert_eq!(rule.as_deref(), Some("record"));
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[2],
        Entity::Field {
            name: "value".to_string(),
            spec: FieldSpec::Bytes {
                len: Length::Field("length".to_string())
            },
            action: Some("inspect".to_string()),
        }
    );
}

#[test]
fn test_root_shorthand_is_one_parser_named_after_the_grammar() {
    let file: GrammarFile = serde_json::from_str(TLV).unwrap();
    let grammars = file.to_grammars().unwrap();
    assert_eq!(grammars.len(), 1);
    let grammar = &grammars[0];
    assert_eq!(grammar.name(), "tlv");
    assert_eq!(grammar.len(), 4);
    assert_eq!(grammar.actions(), ["inspect".to_string()]);
    assert_eq!(grammar.root().unwrap().kind, NodeKind::Sequence);
}

const PING: &str = r#"{
  "name": "ping",
  "parsers": [
    { "name": "request",
      "root": { "kind": "field", "name": "echo", "spec": { "type": "tag", "bytes": [8] } } },
    { "name": "reply",
      "root": { "kind": "sequence", "rule": "reply", "items": [
        { "kind": "field", "name": "echo", "spec": { "type": "tag", "bytes": [0] } },
        { "kind": "field", "name": "seq", "spec": { "type": "uint", "width": 2 } }
      ] } }
  ]
}"#;

#[test]
fn test_named_parsers_lower_separately() {
    let file: GrammarFile = serde_json::from_str(PING).unwrap();
    assert_eq!(file.root, None);
    let names: Vec<_> = file.entries().map(|(name, _)| name).collect();
    assert_eq!(names, ["request", "reply"]);

    let grammars = file.to_grammars().unwrap();
    assert_eq!(grammars[0].name(), "request");
    assert_eq!(grammars[0].len(), 1);
    assert_eq!(grammars[1].name(), "reply");
    assert_eq!(grammars[1].len(), 3);
}

#[test]
fn test_file_without_parsers_lowers_to_nothing() {
    let file: GrammarFile = serde_json::from_str(r#"{ "name": "empty" }"#).unwrap();
    assert!(file.to_grammars().unwrap().is_empty());
}

#[test]
fn test_repeat_defaults() {
    let json = r#"{ "kind": "repeat", "body": { "kind": "field", "name": "b",
                    "spec": { "type": "tag", "bytes": [0] } } }"#;
    let entity: Entity = serde_json::from_str(json).unwrap();
    assert_eq!(
        entity,
        Entity::Repeat {
            rule: None,
            min: 0,
            max: None,
            body: Box::new(Entity::field("b", FieldSpec::tag([0]))),
        }
    );
}

#[test]
fn test_entity_json_round_trip() {
    let entity = Entity::choice(
        "msg",
        vec![
            Entity::field("ping", FieldSpec::tag([0x01])),
            Entity::optional(Entity::field("pong", FieldSpec::uint(4))),
        ],
    );
    let json = serde_json::to_string(&entity).unwrap();
    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entity);
}

#[test]
fn test_unknown_kind_is_rejected() {
    let json = r#"{ "kind": "loop", "body": [] }"#;
    assert!(serde_json::from_str::<Entity>(json).is_err());
}
