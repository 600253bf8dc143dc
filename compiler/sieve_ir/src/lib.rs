//! Shared data model for the Sieve inspection engine.
//!
//! - [`Grammar`] / [`GrammarNode`]: the grammar graph the compiler consumes
//! - [`Entity`] / [`GrammarFile`]: structured grammar descriptions and their
//!   lowering through [`GrammarBuilder`]
//! - [`ByteStream`] / [`BoundedView`]: the input buffer
//! - [`ParseError`] / [`NodeDebugInfo`]: what diagnostics report on
//!
//! Identifiers ([`Gid`], [`NodeId`], [`ActionId`]) are `u32` newtypes so the
//! compiled tables stay dense and cheap to index.

mod buffer;
mod entity;
mod error;
mod field;
mod grammar;
mod id;
mod node;

pub use buffer::{BoundedView, ByteStream, StreamClosed};
pub use entity::{Entity, GrammarFile, ParserEntry};
pub use error::{ErrorKind, ParseError};
pub use field::{decode_uint, Endian, FieldSpec, FieldValue, Length};
pub use grammar::{Grammar, GrammarBuilder, GrammarError};
pub use id::{ActionId, Gid, NodeId};
pub use node::{GrammarNode, NodeDebugInfo, NodeKind, Successors};
