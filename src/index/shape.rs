//! `Extent` and `Position`: the two tuple types all index arithmetic runs on.
//!
//! An [`Extent`] is an N-length tuple of non-negative axis lengths; a
//! [`Position`] is an N-length tuple of signed coordinates. Positions may be
//! negative or exceed an extent when they address halo cells, which is why the
//! two types are kept distinct instead of sharing one alias.

use crate::grid_error::GridHaloError;
use std::fmt;
use std::ops::Index;

/// Per-axis lengths of an N-dimensional box.
///
/// # Invariants
/// - `rank()` is fixed at construction.
/// - `volume()` is the product of all axis lengths (1 for rank 0).
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent(Vec<usize>);

impl Extent {
    /// Build an extent from per-axis lengths.
    pub fn new(axes: impl Into<Vec<usize>>) -> Self {
        Extent(axes.into())
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of all axis lengths; the number of cells in the box.
    #[inline]
    pub fn volume(&self) -> usize {
        self.0.iter().product()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// The same lengths as a signed [`Position`], for bounds arithmetic.
    pub fn to_position(&self) -> Position {
        Position(self.0.iter().map(|&e| e as i64).collect())
    }

    /// Check that `other` has the same rank.
    pub fn check_rank(&self, found: usize) -> Result<(), GridHaloError> {
        if self.rank() != found {
            return Err(GridHaloError::RankMismatch {
                expected: self.rank(),
                found,
            });
        }
        Ok(())
    }
}

impl Index<usize> for Extent {
    type Output = usize;
    #[inline]
    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl From<Vec<usize>> for Extent {
    fn from(v: Vec<usize>) -> Self {
        Extent(v)
    }
}

impl From<&[usize]> for Extent {
    fn from(v: &[usize]) -> Self {
        Extent(v.to_vec())
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Extent").field(&self.0).finish()
    }
}

/// A signed N-dimensional coordinate.
///
/// Negative components and components beyond an extent are legal: they address
/// halo cells of a padded partition. Validity is decided by the operation the
/// position is handed to, not by the type.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position(Vec<i64>);

impl Position {
    pub fn new(coords: impl Into<Vec<i64>>) -> Self {
        Position(coords.into())
    }

    /// The origin of the given rank.
    pub fn zeros(rank: usize) -> Self {
        Position(vec![0; rank])
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Component-wise sum. Ranks must agree.
    pub fn add(&self, other: &Position) -> Result<Position, GridHaloError> {
        if self.rank() != other.rank() {
            return Err(GridHaloError::RankMismatch {
                expected: self.rank(),
                found: other.rank(),
            });
        }
        Ok(Position(
            self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect(),
        ))
    }

    /// Component-wise difference (`self - other`). Ranks must agree.
    pub fn sub(&self, other: &Position) -> Result<Position, GridHaloError> {
        if self.rank() != other.rank() {
            return Err(GridHaloError::RankMismatch {
                expected: self.rank(),
                found: other.rank(),
            });
        }
        Ok(Position(
            self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect(),
        ))
    }

    /// Reinterpret as an extent; every component must be non-negative.
    pub fn to_extent(&self) -> Result<Extent, GridHaloError> {
        if self.0.iter().any(|&c| c < 0) {
            return Err(GridHaloError::OutOfBounds {
                pos: self.0.clone(),
                extent: vec![],
            });
        }
        Ok(Extent(self.0.iter().map(|&c| c as usize).collect()))
    }
}

impl Index<usize> for Position {
    type Output = i64;
    #[inline]
    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl From<Vec<i64>> for Position {
    fn from(v: Vec<i64>) -> Self {
        Position(v)
    }
}

impl From<&[i64]> for Position {
    fn from(v: &[i64]) -> Self {
        Position(v.to_vec())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Position").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_volume_and_rank() {
        let e = Extent::new(vec![3, 4, 5]);
        assert_eq!(e.rank(), 3);
        assert_eq!(e.volume(), 60);
        assert_eq!(e[1], 4);
    }

    #[test]
    fn empty_extent_has_unit_volume() {
        let e = Extent::new(Vec::new());
        assert_eq!(e.rank(), 0);
        assert_eq!(e.volume(), 1);
    }

    #[test]
    fn position_add_sub() {
        let a = Position::new(vec![1, -2]);
        let b = Position::new(vec![3, 5]);
        assert_eq!(a.add(&b).unwrap(), Position::new(vec![4, 3]));
        assert_eq!(b.sub(&a).unwrap(), Position::new(vec![2, 7]));
    }

    #[test]
    fn rank_mismatch_rejected() {
        let a = Position::new(vec![1]);
        let b = Position::new(vec![1, 2]);
        assert!(matches!(
            a.add(&b),
            Err(GridHaloError::RankMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn negative_position_is_not_an_extent() {
        let p = Position::new(vec![2, -1]);
        assert!(p.to_extent().is_err());
        assert_eq!(
            Position::new(vec![2, 1]).to_extent().unwrap(),
            Extent::new(vec![2, 1])
        );
    }

    #[test]
    fn serde_roundtrip() {
        let e = Extent::new(vec![7, 8]);
        let s = serde_json::to_string(&e).unwrap();
        let back: Extent = serde_json::from_str(&s).unwrap();
        assert_eq!(back, e);
    }
}
