//! Row-major flatten/unflatten between N-dimensional positions and flat offsets.
//!
//! Convention: the **last axis varies fastest**, so
//! `multiplier[i] = product(extent[i+1..])`. [`unflatten`] is the exact left
//! inverse of [`flatten`] for every valid offset, which is property-tested in
//! `tests/index_roundtrip.rs`.

use crate::grid_error::GridHaloError;
use crate::index::shape::{Extent, Position};

/// Per-axis stride of the row-major layout: `multiplier[i] = product(extent[i+1..])`.
pub fn multipliers(extent: &Extent) -> Vec<usize> {
    let mut mult = vec![1usize; extent.rank()];
    for axis in (0..extent.rank().saturating_sub(1)).rev() {
        mult[axis] = mult[axis + 1] * extent[axis + 1];
    }
    mult
}

/// Map `pos` to its flat storage offset under `extent`.
///
/// # Errors
/// Returns `RankMismatch` if the ranks differ, `OutOfBounds` unless
/// `0 <= pos[i] < extent[i]` on every axis.
pub fn flatten(extent: &Extent, pos: &Position) -> Result<usize, GridHaloError> {
    extent.check_rank(pos.rank())?;
    let mut offset = 0usize;
    for axis in 0..extent.rank() {
        let c = pos[axis];
        if c < 0 || c as usize >= extent[axis] {
            return Err(GridHaloError::OutOfBounds {
                pos: pos.as_slice().to_vec(),
                extent: extent.as_slice().to_vec(),
            });
        }
        offset = offset * extent[axis] + c as usize;
    }
    Ok(offset)
}

/// Map a flat storage offset back to its position under `extent`.
///
/// # Errors
/// Returns `OffsetOutOfBounds` if `offset >= extent.volume()`.
pub fn unflatten(extent: &Extent, offset: usize) -> Result<Position, GridHaloError> {
    let volume = extent.volume();
    if offset >= volume {
        return Err(GridHaloError::OffsetOutOfBounds { offset, volume });
    }
    let mut rem = offset;
    let mut coords = vec![0i64; extent.rank()];
    for axis in (0..extent.rank()).rev() {
        coords[axis] = (rem % extent[axis]) as i64;
        rem /= extent[axis];
    }
    Ok(Position::new(coords))
}
