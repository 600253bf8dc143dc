//! Grammars shared by the unit tests.

use sieve_ir::{Entity, FieldSpec, GrammarBuilder};

use crate::{compile, CompiledParser};

pub(crate) fn build(root: &Entity) -> CompiledParser {
    let grammar = GrammarBuilder::new("test").build(root).unwrap();
    compile(&grammar).unwrap()
}

/// `pair: FieldA(u16) FieldB(u16)`
pub(crate) fn pair() -> Entity {
    Entity::sequence(
        "pair",
        vec![
            Entity::field("FieldA", FieldSpec::uint(2)),
            Entity::field("FieldB", FieldSpec::uint(2)),
        ],
    )
}

/// `marker: FieldA(ff) | FieldB(00)`
pub(crate) fn marker() -> Entity {
    Entity::choice(
        "marker",
        vec![
            Entity::field("FieldA", FieldSpec::tag([0xff])),
            Entity::field("FieldB", FieldSpec::tag([0x00])),
        ],
    )
}

/// `items: Item(u8)*`
pub(crate) fn items(min: u32, max: Option<u32>) -> Entity {
    Entity::repeat("items", min, max, Entity::field("Item", FieldSpec::uint(1)))
}
