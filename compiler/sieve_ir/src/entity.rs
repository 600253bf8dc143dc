//! Structured grammar descriptions.
//!
//! An [`Entity`] tree is what grammar authors write (directly in Rust or as
//! JSON via [`GrammarFile`]). [`crate::GrammarBuilder`] lowers it into the flat
//! node graph the compiler consumes.
//!
//! A grammar file exports one or more named parsers, e.g. the request and
//! response sides of a protocol. `root` is shorthand for a single parser
//! named after the grammar.
//!
//! ```text
//! {
//!   "name": "tlv",
//!   "parsers": [{
//!     "name": "record",
//!     "root": {
//!       "kind": "sequence", "rule": "record", "items": [
//!         { "kind": "field", "name": "type", "spec": { "type": "uint", "width": 1 } },
//!         { "kind": "field", "name": "length", "spec": { "type": "uint", "width": 2 } },
//!         { "kind": "field", "name": "value", "spec": { "type": "bytes", "len": "length" } }
//!       ]
//!     }
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{FieldSpec, Grammar, GrammarBuilder, GrammarError};

/// One structured grammar element.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Field {
        name: String,
        spec: FieldSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
    },
    Sequence {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule: Option<String>,
        items: Vec<Entity>,
    },
    Choice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule: Option<String>,
        alternatives: Vec<Entity>,
    },
    Repeat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule: Option<String>,
        #[serde(default)]
        min: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u32>,
        body: Box<Entity>,
    },
    Optional {
        body: Box<Entity>,
    },
}

impl Entity {
    pub fn field(name: impl Into<String>, spec: FieldSpec) -> Self {
        Entity::Field {
            name: name.into(),
            spec,
            action: None,
        }
    }

    /// Field whose decoded value is handed to an external action.
    pub fn field_with_action(
        name: impl Into<String>,
        spec: FieldSpec,
        action: impl Into<String>,
    ) -> Self {
        Entity::Field {
            name: name.into(),
            spec,
            action: Some(action.into()),
        }
    }

    pub fn sequence(rule: impl Into<String>, items: Vec<Entity>) -> Self {
        Entity::Sequence {
            rule: Some(rule.into()),
            items,
        }
    }

    pub fn choice(rule: impl Into<String>, alternatives: Vec<Entity>) -> Self {
        Entity::Choice {
            rule: Some(rule.into()),
            alternatives,
        }
    }

    pub fn repeat(rule: impl Into<String>, min: u32, max: Option<u32>, body: Entity) -> Self {
        Entity::Repeat {
            rule: Some(rule.into()),
            min,
            max,
            body: Box::new(body),
        }
    }

    pub fn optional(body: Entity) -> Self {
        Entity::Optional {
            body: Box::new(body),
        }
    }
}

/// A named entry point of a grammar file.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ParserEntry {
    pub name: String,
    pub root: Entity,
}

/// A grammar description file.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct GrammarFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Entity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parsers: Vec<ParserEntry>,
}

impl GrammarFile {
    /// Exported parsers in declaration order, the `root` shorthand first.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.root
            .iter()
            .map(|root| (self.name.as_str(), root))
            .chain(
                self.parsers
                    .iter()
                    .map(|entry| (entry.name.as_str(), &entry.root)),
            )
    }

    /// Lower every exported parser into its own validated grammar graph.
    pub fn to_grammars(&self) -> Result<Vec<Grammar>, GrammarError> {
        self.entries()
            .map(|(name, root)| GrammarBuilder::new(name).build(root))
            .collect()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
