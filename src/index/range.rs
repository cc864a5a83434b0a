//! Lazy iteration over the positions of an N-dimensional half-open box.
//!
//! [`PositionRange`] walks every position in `[begin, end)` component-wise in
//! row-major order (first axis outermost, last axis fastest). The range itself
//! is `Clone`, so a fresh walk is a clone away.

use crate::grid_error::GridHaloError;
use crate::index::shape::Position;

/// Iterator over all positions in the half-open box `[begin, end)`.
///
/// Empty if `begin[i] >= end[i]` on any axis. Rank 0 yields the single empty
/// position once, matching the convention that a rank-0 box has volume 1.
#[derive(Clone, Debug)]
pub struct PositionRange {
    begin: Position,
    end: Position,
    cursor: Option<Position>,
}

impl PositionRange {
    /// Build a range over `[begin, end)`.
    ///
    /// # Errors
    /// Returns `RankMismatch` if the two corners disagree on rank.
    pub fn new(begin: Position, end: Position) -> Result<Self, GridHaloError> {
        if begin.rank() != end.rank() {
            return Err(GridHaloError::RankMismatch {
                expected: begin.rank(),
                found: end.rank(),
            });
        }
        let non_empty = begin.iter().zip(end.iter()).all(|(b, e)| b < e);
        let cursor = non_empty.then(|| begin.clone());
        Ok(PositionRange { begin, end, cursor })
    }

    /// Lower corner (inclusive).
    pub fn begin(&self) -> &Position {
        &self.begin
    }

    /// Upper corner (exclusive).
    pub fn end(&self) -> &Position {
        &self.end
    }

    /// Number of positions the full walk visits.
    pub fn len(&self) -> usize {
        self.begin
            .iter()
            .zip(self.end.iter())
            .map(|(b, e)| (e - b).max(0) as usize)
            .product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for PositionRange {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        let current = self.cursor.take()?;
        // Odometer increment, last axis fastest.
        let mut coords = current.as_slice().to_vec();
        for axis in (0..coords.len()).rev() {
            coords[axis] += 1;
            if coords[axis] < self.end[axis] {
                self.cursor = Some(Position::new(coords));
                return Some(current);
            }
            coords[axis] = self.begin[axis];
        }
        // Wrapped every axis (or rank 0): the walk is done.
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.cursor {
            None => (0, Some(0)),
            Some(_) => (1, Some(self.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(v: &[i64]) -> Position {
        Position::new(v.to_vec())
    }

    #[test]
    fn visits_row_major() {
        let r = PositionRange::new(pos(&[0, 0]), pos(&[2, 3])).unwrap();
        let visited: Vec<_> = r.collect();
        let expected: Vec<Position> = [
            [0, 0], [0, 1], [0, 2], [1, 0], [1, 1], [1, 2],
        ]
        .iter()
        .map(|c| pos(c))
        .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn negative_corners_allowed() {
        let r = PositionRange::new(pos(&[-1]), pos(&[2])).unwrap();
        let visited: Vec<_> = r.collect();
        assert_eq!(visited, vec![pos(&[-1]), pos(&[0]), pos(&[1])]);
    }

    #[test]
    fn empty_when_any_axis_degenerate() {
        let r = PositionRange::new(pos(&[0, 5]), pos(&[3, 5])).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.count(), 0);
    }

    #[test]
    fn restartable_via_clone() {
        let r = PositionRange::new(pos(&[0]), pos(&[4])).unwrap();
        let first: Vec<_> = r.clone().collect();
        let second: Vec<_> = r.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn rank_zero_yields_once() {
        let r = PositionRange::new(pos(&[]), pos(&[])).unwrap();
        assert_eq!(r.count(), 1);
    }

    #[test]
    fn rank_mismatch_rejected() {
        assert!(matches!(
            PositionRange::new(pos(&[0]), pos(&[1, 1])),
            Err(GridHaloError::RankMismatch { .. })
        ));
    }
}
