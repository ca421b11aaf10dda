// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for trace loading.
//!
//! Decode, structural, and orphan failures are fatal for the whole trace
//! load: no partial [`Trace`](crate::Trace) is ever returned. Assertion
//! failures are not errors; they are reported as
//! [`QueryResult`](crate::QueryResult) values.

use alloc::vec::Vec;
use core::fmt;

/// Malformed container bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer does not start with the container magic.
    BadMagic,
    /// The container version is not understood.
    UnsupportedVersion(u16),
    /// The trace kind byte is not understood.
    UnknownKind(u8),
    /// An unknown tag was found at the given byte offset.
    UnknownTag {
        /// Offending tag byte.
        tag: u8,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// The buffer ended in the middle of a value.
    Truncated {
        /// Byte offset where more input was expected.
        offset: usize,
    },
    /// A node name is not valid UTF-8.
    InvalidName {
        /// Byte offset of the name payload.
        offset: usize,
    },
    /// A record's kind does not match the container kind.
    KindMismatch {
        /// Byte offset of the record tag.
        offset: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => f.write_str("not a flicker trace (bad magic)"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported container version {v}"),
            Self::UnknownKind(k) => write!(f, "unknown trace kind {k}"),
            Self::UnknownTag { tag, offset } => {
                write!(f, "unknown tag {tag:#04x} at offset {offset}")
            }
            Self::Truncated { offset } => write!(f, "unexpected end of data at offset {offset}"),
            Self::InvalidName { offset } => write!(f, "invalid UTF-8 name at offset {offset}"),
            Self::KindMismatch { offset } => {
                write!(f, "record kind does not match trace kind at offset {offset}")
            }
        }
    }
}

impl core::error::Error for DecodeError {}

/// Structural corruption found while loading a trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The container bytes could not be decoded.
    Decode(DecodeError),
    /// Two different records share one id within an entry.
    DuplicateId {
        /// Entry timestamp.
        timestamp: i64,
        /// Duplicated id.
        id: i32,
    },
    /// A record names itself as its parent.
    SelfParent {
        /// Entry timestamp.
        timestamp: i64,
        /// Offending id.
        id: i32,
    },
    /// Records whose parent links form a loop with no root.
    Cycle {
        /// Entry timestamp.
        timestamp: i64,
        /// Ids caught in or below the loop.
        ids: Vec<i32>,
    },
    /// A non-empty entry has no display root.
    MissingDisplayRoot {
        /// Entry timestamp.
        timestamp: i64,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode failed: {e}"),
            Self::DuplicateId { timestamp, id } => {
                write!(f, "duplicate node id {id} at timestamp {timestamp}")
            }
            Self::SelfParent { timestamp, id } => {
                write!(f, "node {id} is its own parent at timestamp {timestamp}")
            }
            Self::Cycle { timestamp, ids } => {
                write!(f, "parent cycle at timestamp {timestamp} through ids {ids:?}")
            }
            Self::MissingDisplayRoot { timestamp } => {
                write!(f, "no display root found at timestamp {timestamp}")
            }
        }
    }
}

impl core::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for ParseError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

/// A parent id that never resolved to a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrphanError {
    /// Entry timestamp.
    pub timestamp: i64,
    /// The unresolved parent id.
    pub parent_id: i32,
    /// Ids of the records that named it as parent.
    pub child_ids: Vec<i32>,
}

impl fmt::Display for OrphanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "orphaned nodes at timestamp {}: parent {} not found for children {:?}",
            self.timestamp, self.parent_id, self.child_ids
        )
    }
}

impl core::error::Error for OrphanError {}

/// Any failure to load or look up trace entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceError {
    /// Malformed bytes or hierarchy.
    Parse(ParseError),
    /// Unresolved parent references rejected by the orphan policy.
    Orphan(OrphanError),
    /// No entry has exactly this timestamp.
    EntryNotFound {
        /// Requested timestamp.
        timestamp: i64,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Orphan(e) => e.fmt(f),
            Self::EntryNotFound { timestamp } => {
                write!(f, "no trace entry at timestamp {timestamp}")
            }
        }
    }
}

impl core::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Orphan(e) => Some(e),
            Self::EntryNotFound { .. } => None,
        }
    }
}

impl From<ParseError> for TraceError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<DecodeError> for TraceError {
    fn from(e: DecodeError) -> Self {
        Self::Parse(ParseError::Decode(e))
    }
}

impl From<OrphanError> for TraceError {
    fn from(e: OrphanError) -> Self {
        Self::Orphan(e)
    }
}
