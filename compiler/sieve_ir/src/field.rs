//! Field descriptors and decoded field values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte order of a multi-byte unsigned field.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// Length of a byte-string field.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    /// A constant number of bytes.
    Fixed(usize),
    /// The value of the most recently parsed unsigned field with this name.
    Field(String),
}

/// How a field node consumes bytes.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSpec {
    /// Unsigned integer of `width` bytes (1..=8).
    Uint {
        width: u8,
        #[serde(default)]
        endian: Endian,
    },
    /// Opaque byte string.
    Bytes { len: Length },
    /// Fixed byte sequence that must match exactly.
    Tag { bytes: Vec<u8> },
}

impl FieldSpec {
    /// Big-endian unsigned integer.
    pub fn uint(width: u8) -> Self {
        FieldSpec::Uint {
            width,
            endian: Endian::Big,
        }
    }

    /// Fixed-length byte string.
    pub fn bytes(len: usize) -> Self {
        FieldSpec::Bytes {
            len: Length::Fixed(len),
        }
    }

    /// Byte string whose length is read from an earlier field.
    pub fn bytes_sized_by(field: impl Into<String>) -> Self {
        FieldSpec::Bytes {
            len: Length::Field(field.into()),
        }
    }

    pub fn tag(bytes: impl Into<Vec<u8>>) -> Self {
        FieldSpec::Tag {
            bytes: bytes.into(),
        }
    }

    /// Number of bytes consumed when known without runtime state.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            FieldSpec::Uint { width, .. } => Some(usize::from(*width)),
            FieldSpec::Bytes {
                len: Length::Fixed(n),
            } => Some(*n),
            FieldSpec::Bytes {
                len: Length::Field(_),
            } => None,
            FieldSpec::Tag { bytes } => Some(bytes.len()),
        }
    }

    /// Short label used in debug tables.
    pub fn label(&self) -> &'static str {
        match self {
            FieldSpec::Uint { .. } => "uint",
            FieldSpec::Bytes { .. } => "bytes",
            FieldSpec::Tag { .. } => "tag",
        }
    }
}

/// A decoded field value.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Uint(u64),
    Bytes(Vec<u8>),
}

impl FieldValue {
    #[inline]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FieldValue::Uint(v) => Some(*v),
            FieldValue::Bytes(_) => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Uint(_) => None,
            FieldValue::Bytes(b) => Some(b),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Uint(v) => write!(f, "{v:#x}"),
            FieldValue::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decode an unsigned integer of at most 8 bytes.
pub fn decode_uint(bytes: &[u8], endian: Endian) -> u64 {
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    match endian {
        Endian::Big => bytes.iter().fold(0, fold),
        Endian::Little => bytes.iter().rev().fold(0, fold),
    }
}
