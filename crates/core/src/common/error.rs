//! Error definitions.
//!
//! The simulator has exactly two failure points, both outside the access path:
//! 1. **Construction:** An invalid level geometry or an empty level list ([`BuildError`]).
//! 2. **Input:** Reading a hierarchy description ([`ConfigError`]) or an access trace ([`TraceError`]).
//!
//! Loads, stores, flushes and reports never fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ReplacementPolicy;

/// A hierarchy description that cannot be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No levels were given.
    #[error("cache hierarchy has no levels")]
    EmptyHierarchy,

    /// The line size of a level is zero or not a power of two.
    #[error("level `{level}`: line size {value} is not a power of two")]
    LineSizeNotPowerOfTwo {
        /// Level name.
        level: String,
        /// Offending line size in bytes.
        value: u64,
    },

    /// The set count of a level is zero or not a power of two.
    #[error("level `{level}`: set count {value} is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Level name.
        level: String,
        /// Offending set count.
        value: u64,
    },

    /// A level has associativity zero.
    #[error("level `{level}`: associativity must be at least 1")]
    ZeroAssociativity {
        /// Level name.
        level: String,
    },

    /// The chosen replacement policy cannot manage sets of this associativity.
    #[error("level `{level}`: {policy:?} replacement needs a power-of-two associativity, got {ways}")]
    PolicyGeometry {
        /// Level name.
        level: String,
        /// Policy requested for the level.
        policy: ReplacementPolicy,
        /// Requested associativity.
        ways: usize,
    },

    /// `sets × ways` overflows or exceeds the per-level line limit.
    #[error("level `{level}`: {sets} sets of {ways} ways is too many lines")]
    GeometryTooLarge {
        /// Level name.
        level: String,
        /// Requested set count.
        sets: u64,
        /// Requested associativity.
        ways: usize,
    },
}

/// Failure to load a hierarchy description.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The description file could not be read.
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The JSON form did not deserialize.
    #[error("invalid JSON hierarchy description: {0}")]
    Json(#[from] serde_json::Error),

    /// The cachedef text form is malformed.
    #[error("cachedef line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The description parsed but describes an invalid hierarchy.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Failure to read an access trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A trace line is malformed.
    #[error("trace line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The trace source failed.
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),
}
