//! Property tests: compilation is total and deterministic, parsing always
//! terminates, and parsers are shareable across threads.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use rayon::prelude::*;
use sieve_ir::{ByteStream, Entity, FieldSpec, GrammarBuilder, NodeId};
use sieve_parse::{compile, step, CompiledParser, ParseContext, StepOutcome};

fn field_strategy() -> impl Strategy<Value = Entity> {
    prop_oneof![
        (1u8..=4).prop_map(FieldSpec::uint),
        (0usize..3).prop_map(FieldSpec::bytes),
        prop::collection::vec(any::<u8>(), 1..3).prop_map(FieldSpec::tag),
    ]
    .prop_map(|spec| Entity::field("f", spec))
}

fn entity_strategy() -> impl Strategy<Value = Entity> {
    field_strategy().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|items| Entity::sequence("seq", items)),
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|alternatives| Entity::choice("alt", alternatives)),
            (0u32..3, prop::option::of(0u32..3), inner.clone()).prop_map(
                |(min, extra, body)| Entity::repeat("rep", min, extra.map(|e| min + e), body)
            ),
            inner.prop_map(Entity::optional),
        ]
    })
}

fn build(root: &Entity) -> CompiledParser {
    compile(&GrammarBuilder::new("prop").build(root).unwrap()).unwrap()
}

fn parse(parser: &CompiledParser, input: &[u8]) -> (StepOutcome, Vec<NodeId>, usize) {
    let stream = ByteStream::complete(input.to_vec());
    let mut ctx = ParseContext::new(parser).with_trace();
    let outcome = step(parser, &mut ctx, &stream);
    let trace = ctx.trace().unwrap().to_vec();
    (outcome, trace, ctx.cursor())
}

proptest! {
    #[test]
    fn ids_are_dense_and_resolvable(root in entity_strategy()) {
        let parser = build(&root);
        prop_assert!(!parser.is_empty());
        prop_assert_eq!(parser.debug_table().len(), parser.len());
        for raw in 1..=parser.len() as u32 {
            let id = NodeId::new(raw);
            let node = parser.node(id).unwrap();
            prop_assert_eq!(parser.id_of(node.gid), Some(id));
            prop_assert!(parser.debug_info(id).is_some());
        }
        prop_assert!(parser.node(NodeId::EXIT).is_none());
        prop_assert!(parser.node(NodeId::FINISH).is_none());
    }

    #[test]
    fn compile_is_deterministic(root in entity_strategy()) {
        let grammar = GrammarBuilder::new("prop").build(&root).unwrap();
        let first = compile(&grammar).unwrap();
        let second = compile(&grammar).unwrap();
        prop_assert_eq!(first.dump_table(), second.dump_table());
    }

    #[test]
    fn closed_stream_parse_terminates_deterministically(
        root in entity_strategy(),
        input in prop::collection::vec(any::<u8>(), 0..24),
    ) {
        let parser = build(&root);
        let first = parse(&parser, &input);
        prop_assert!(matches!(first.0, StepOutcome::Finished | StepOutcome::Failed));
        prop_assert!(first.2 <= input.len());
        let second = parse(&parser, &input);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn parser_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompiledParser>();

    let parser = build(&Entity::repeat(
        "items",
        0,
        None,
        Entity::field("Item", FieldSpec::uint(2)),
    ));
    let inputs: Vec<Vec<u8>> = (0u8..64).map(|n| vec![n; usize::from(n % 9)]).collect();

    let sequential: Vec<_> = inputs.iter().map(|input| parse(&parser, input)).collect();
    let parallel: Vec<_> = inputs.par_iter().map(|input| parse(&parser, input)).collect();
    assert_eq!(sequential, parallel);
}
