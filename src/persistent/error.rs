//! Error types for the persistent containers.
//!
//! Every error here is raised synchronously at the call site and leaves the
//! container it was raised from untouched.

use std::fmt;

use super::SequenceNumber;

/// Raised by [`build`](super::build) when the flat argument list has an odd
/// length, so the last key has no value.
///
/// # Examples
///
/// ```rust
/// use seqmap::persistent::{OddArgumentCount, build};
///
/// let error = build(["a", "1", "b"]).unwrap_err();
/// assert_eq!(error, OddArgumentCount { trailing: "b" });
/// assert_eq!(
///     format!("{error}"),
///     "odd number of arguments: key \"b\" has no matching value"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("odd number of arguments: key {trailing:?} has no matching value")]
pub struct OddArgumentCount<T: fmt::Debug> {
    /// The unmatched trailing element.
    pub trailing: T,
}

/// Raised by [`OrderedMap::nth`](super::OrderedMap::nth) when no entry carries
/// the requested sequence number.
///
/// That happens both when `index` lies outside `0..next_sequence` and when the
/// entry inserted at `index` has since been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("index {index} out of range for a map of {count} entries (sequence numbers issued: {next_sequence})")]
pub struct IndexOutOfRange {
    /// The requested index.
    pub index: usize,
    /// Number of entries in the map at the time of the lookup.
    pub count: usize,
    /// The next sequence number the map would assign.
    pub next_sequence: SequenceNumber,
}

/// Raised when an in-place mutation is requested from a persistent container
/// through the [`MutableMap`](crate::capability::MutableMap) surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{container}::{operation}: persistent containers cannot be mutated in place")]
pub struct UnsupportedMutation {
    /// The container type that rejected the call.
    pub container: &'static str,
    /// The rejected operation (`"put"`, `"remove"`, `"clear"`, `"put_all"`).
    pub operation: &'static str,
}
