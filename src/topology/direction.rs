//! Relative neighbour directions and their enumeration per connectivity model.
//!
//! A [`Direction`] is a position restricted to components in `{-1, 0, 1}`;
//! the zero vector denotes "interior". [`enumerate`] returns the fixed
//! direction set of a connectivity model in a stable order, computed once per
//! `(rank, connectivity)` and shared read-only process-wide, so every call
//! site sizes its per-direction arrays identically.

use crate::grid_error::GridHaloError;
use crate::index::shape::Position;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// Which neighbours a subdomain exchanges halos with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Connectivity {
    /// The `2N` axis-aligned unit vectors.
    Star,
    /// All `3^N - 1` nonzero vectors with components in `{-1, 0, 1}`.
    Box,
}

/// A relative neighbour offset with components in `{-1, 0, 1}`.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Direction(Vec<i64>);

impl Direction {
    /// Build a direction, validating every component.
    ///
    /// # Errors
    /// Returns `InvalidDirection` if any component is outside `{-1, 0, 1}`.
    pub fn new(components: impl Into<Vec<i64>>) -> Result<Self, GridHaloError> {
        let components = components.into();
        if components.iter().any(|&c| !(-1..=1).contains(&c)) {
            return Err(GridHaloError::InvalidDirection(components));
        }
        Ok(Direction(components))
    }

    /// The interior (zero) direction of the given rank.
    pub fn zero(rank: usize) -> Self {
        Direction(vec![0; rank])
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// The opposite direction; what a neighbour calls this edge.
    pub fn flip(&self) -> Direction {
        Direction(self.0.iter().map(|&c| -c).collect())
    }

    /// View as a general [`Position`] for coordinate arithmetic.
    pub fn to_position(&self) -> Position {
        Position::new(self.0.clone())
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Direction").field(&self.0).finish()
    }
}

// Process-wide memoized tables; pure function of (rank, connectivity).
static TABLES: Lazy<DashMap<(usize, Connectivity), Arc<Vec<Direction>>>> = Lazy::new(DashMap::new);

/// Enumerate the direction set of `connectivity` in `rank` dimensions.
///
/// The order is fixed and deterministic:
/// - `Star`: per axis in order, `-1` then `+1`.
/// - `Box`: row-major over components in `(-1, 0, 1)`, zero vector skipped.
///
/// The returned slice is shared; repeated calls return the same table.
pub fn enumerate(rank: usize, connectivity: Connectivity) -> Arc<Vec<Direction>> {
    if let Some(existing) = TABLES.get(&(rank, connectivity)) {
        return existing.clone();
    }
    let table = Arc::new(build_table(rank, connectivity));
    TABLES
        .entry((rank, connectivity))
        .or_insert(table)
        .clone()
}

fn build_table(rank: usize, connectivity: Connectivity) -> Vec<Direction> {
    match connectivity {
        Connectivity::Star => {
            let mut dirs = Vec::with_capacity(2 * rank);
            for axis in 0..rank {
                for sign in [-1i64, 1] {
                    let mut c = vec![0i64; rank];
                    c[axis] = sign;
                    dirs.push(Direction(c));
                }
            }
            dirs
        }
        Connectivity::Box => {
            let count = 3usize.pow(rank as u32);
            let mut dirs = Vec::with_capacity(count.saturating_sub(1));
            for code in 0..count {
                let mut c = vec![0i64; rank];
                let mut rem = code;
                for axis in (0..rank).rev() {
                    c[axis] = (rem % 3) as i64 - 1;
                    rem /= 3;
                }
                if c.iter().any(|&v| v != 0) {
                    dirs.push(Direction(c));
                }
            }
            dirs
        }
    }
}

/// Stable slot of `dir` within `enumerate(dir.rank(), connectivity)`.
///
/// Used to size fixed per-direction arrays; a bijection onto `[0, count)`.
///
/// # Errors
/// Returns `InvalidDirection` if `dir` is not in the enumerated set (for
/// `Star`, any diagonal; for either model, the zero vector).
pub fn slot_index(dir: &Direction, connectivity: Connectivity) -> Result<usize, GridHaloError> {
    enumerate(dir.rank(), connectivity)
        .iter()
        .position(|d| d == dir)
        .ok_or_else(|| GridHaloError::InvalidDirection(dir.as_slice().to_vec()))
}
