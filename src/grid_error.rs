//! GridHaloError: Unified error type for grid-halo public APIs
//!
//! This error type is used throughout the grid-halo library to provide robust,
//! non-panicking error handling for all public APIs. Every variant is a local
//! precondition violation surfaced to the immediate caller; only
//! [`ChannelFailure`](GridHaloError::ChannelFailure) is eligible for
//! caller-directed retry (by re-issuing the whole update step).

use thiserror::Error;

/// Unified error type for grid-halo operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridHaloError {
    /// A position fell outside the addressable bounds of an extent.
    #[error("position {pos:?} out of bounds for extent {extent:?}")]
    OutOfBounds { pos: Vec<i64>, extent: Vec<usize> },
    /// A flat offset exceeded the volume of the extent it addresses.
    #[error("flat offset {offset} out of bounds for volume {volume}")]
    OffsetOutOfBounds { offset: usize, volume: usize },
    /// Two tuples that must share a rank (axis count) did not.
    #[error("rank mismatch: expected {expected} axes, found {found}")]
    RankMismatch { expected: usize, found: usize },
    /// A direction vector was malformed or not part of the enumerated set.
    #[error("invalid direction vector {0:?}")]
    InvalidDirection(Vec<i64>),
    /// No axis-wise factorization of the requested subdomain count fits the grid.
    #[error("no feasible split of {count} subdomains over global extent {extent:?}")]
    SplitInfeasible { count: usize, extent: Vec<usize> },
    /// A subdomain id outside `[0, subdomain_count)`.
    #[error("subdomain id {id} outside [0, {count})")]
    InvalidId { id: usize, count: usize },
    /// A slice copy between differently-shaped boxes.
    #[error("shape mismatch: source extent {from:?}, destination extent {to:?}")]
    DimensionMismatch { from: Vec<usize>, to: Vec<usize> },
    /// Communication attempted along an edge with no neighbour.
    #[error("no neighbour along direction {0:?}")]
    NoSuchNeighbour(Vec<i64>),
    /// Transport-level send/receive failure; aborts the current step.
    #[error("channel failure on `{channel}`: {reason}")]
    ChannelFailure { channel: String, reason: String },
}
