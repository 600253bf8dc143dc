use super::*;
use crate::{Entity, GrammarNode};
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn field_node(gid: u32, succ: &[u32]) -> GrammarNode {
    let mut node = GrammarNode::new(
        Gid::new(gid),
        NodeKind::Field {
            spec: FieldSpec::uint(1),
            action: None,
        },
    );
    node.successors = succ.iter().copied().map(Gid::new).collect();
    node
}

#[test]
fn test_builder_sequence_chains_items() {
    let entity = Entity::sequence(
        "pair",
        vec![
            Entity::field("a", FieldSpec::uint(2)),
            Entity::field("b", FieldSpec::uint(2)),
        ],
    );
    let grammar = GrammarBuilder::new("pair").build(&entity).unwrap();

    let root = grammar.root().unwrap();
    assert_eq!(root.kind, NodeKind::Sequence);
    assert_eq!(root.rule.as_deref(), Some("pair"));

    let a = grammar.node(root.successors[0]).unwrap();
    assert_eq!(a.name.as_deref(), Some("a"));
    assert_eq!(a.rule.as_deref(), Some("pair"));

    let b = grammar.node(a.successors[0]).unwrap();
    assert_eq!(b.name.as_deref(), Some("b"));
    assert!(b.successors.is_empty());
    assert_eq!(grammar.len(), 3);
}

#[test]
fn test_builder_choice_commits_all_but_last() {
    let entity = Entity::choice(
        "either",
        vec![
            Entity::field("x", FieldSpec::tag([1])),
            Entity::field("y", FieldSpec::tag([2])),
            Entity::field("z", FieldSpec::tag([3])),
        ],
    );
    let grammar = GrammarBuilder::new("either").build(&entity).unwrap();
    let root = grammar.root().unwrap();
    assert_eq!(root.kind, NodeKind::Choice);
    assert_eq!(root.successors.len(), 3);

    let commits: Vec<_> = root
        .successors
        .iter()
        .map(|&alt| {
            let alt = grammar.node(alt).unwrap();
            alt.successors
                .first()
                .map(|&next| grammar.node(next).unwrap().kind.clone())
        })
        .collect();
    assert_eq!(
        commits,
        vec![
            Some(NodeKind::Commit { owner: root.gid }),
            Some(NodeKind::Commit { owner: root.gid }),
            None,
        ]
    );
}

#[test]
fn test_builder_repeat_closes_cycle() {
    let entity = Entity::repeat("items", 0, None, Entity::field("item", FieldSpec::uint(1)));
    let grammar = GrammarBuilder::new("items").build(&entity).unwrap();
    let root = grammar.root().unwrap();
    assert_eq!(root.kind, NodeKind::Repeat { min: 0, max: None });

    let body = root.successors[0];
    let exit = root.successors[1];
    assert_eq!(grammar.node(exit).unwrap().kind, NodeKind::Terminal);

    let item = grammar.node(body).unwrap();
    let commit = grammar.node(item.successors[0]).unwrap();
    assert_eq!(commit.kind, NodeKind::Commit { owner: root.gid });
    let expected: crate::Successors = smallvec![body, exit];
    assert_eq!(commit.successors, expected);
}

#[test]
fn test_builder_optional_is_bounded_repeat() {
    let entity = Entity::sequence(
        "opt",
        vec![Entity::optional(Entity::field("flag", FieldSpec::uint(1)))],
    );
    let grammar = GrammarBuilder::new("opt").build(&entity).unwrap();
    let root = grammar.root().unwrap();
    let repeat = grammar.node(root.successors[0]).unwrap();
    assert_eq!(repeat.kind, NodeKind::Repeat { min: 0, max: Some(1) });
    assert_eq!(repeat.rule.as_deref(), Some("opt"));
}

#[test]
fn test_builder_interns_actions_once() {
    let entity = Entity::sequence(
        "acts",
        vec![
            Entity::field_with_action("a", FieldSpec::uint(1), "check"),
            Entity::field_with_action("b", FieldSpec::uint(1), "check"),
            Entity::field_with_action("c", FieldSpec::uint(1), "store"),
        ],
    );
    let grammar = GrammarBuilder::new("acts").build(&entity).unwrap();
    assert_eq!(grammar.actions(), ["check".to_string(), "store".to_string()]);
    assert_eq!(grammar.action_name(ActionId::new(1)), Some("store"));
    assert_eq!(grammar.action_name(ActionId::new(5)), None);
}

#[test]
fn test_builder_rejects_empty_choice() {
    let entity = Entity::choice("nothing", vec![]);
    let err = GrammarBuilder::new("g").build(&entity).unwrap_err();
    assert_eq!(
        err,
        GrammarError::EmptyChoice {
            rule: "nothing".to_string()
        }
    );
}

#[test]
fn test_builder_rejects_inverted_bounds() {
    let entity = Entity::repeat("r", 3, Some(1), Entity::field("x", FieldSpec::uint(1)));
    let err = GrammarBuilder::new("g").build(&entity).unwrap_err();
    assert_eq!(
        err,
        GrammarError::InvalidBounds {
            rule: "r".to_string(),
            min: 3,
            max: 1
        }
    );
}

#[test]
fn test_validate_rejects_wide_integer() {
    let entity = Entity::field("huge", FieldSpec::uint(9));
    let err = GrammarBuilder::new("g").build(&entity).unwrap_err();
    assert_eq!(
        err,
        GrammarError::InvalidWidth {
            name: "huge".to_string(),
            width: 9
        }
    );
}

#[test]
fn test_validate_missing_root() {
    let mut grammar = Grammar::new("empty");
    grammar.insert(field_node(0, &[])).unwrap();
    assert_eq!(
        grammar.validate(),
        Err(GrammarError::MissingRoot("empty".to_string()))
    );
}

#[test]
fn test_validate_dangling_successor() {
    let mut grammar = Grammar::new("dangling");
    grammar.insert(field_node(0, &[7])).unwrap();
    grammar.set_root(Gid::new(0));
    assert_eq!(
        grammar.validate(),
        Err(GrammarError::UnknownNode {
            from: Gid::new(0),
            to: Gid::new(7)
        })
    );
}

#[test]
fn test_insert_duplicate_gid() {
    let mut grammar = Grammar::new("dup");
    grammar.insert(field_node(0, &[])).unwrap();
    assert_eq!(
        grammar.insert(field_node(0, &[])),
        Err(GrammarError::DuplicateGid(Gid::new(0)))
    );
}

#[test]
fn test_validate_field_arity() {
    let mut grammar = Grammar::new("fanout");
    grammar.insert(field_node(0, &[1, 2])).unwrap();
    grammar.insert(field_node(1, &[])).unwrap();
    grammar.insert(field_node(2, &[])).unwrap();
    grammar.set_root(Gid::new(0));
    let err = grammar.validate().unwrap_err();
    assert!(matches!(err, GrammarError::Arity { found: 2, .. }));
}

#[test]
fn test_validate_commit_owner_must_be_construct() {
    let mut grammar = Grammar::new("owner");
    grammar.insert(field_node(0, &[1])).unwrap();
    let mut commit = GrammarNode::new(Gid::new(1), NodeKind::Commit { owner: Gid::new(0) });
    commit.successors = smallvec![];
    grammar.insert(commit).unwrap();
    grammar.set_root(Gid::new(0));
    assert_eq!(
        grammar.validate(),
        Err(GrammarError::BadOwner {
            gid: Gid::new(1),
            owner: Gid::new(0)
        })
    );
}
