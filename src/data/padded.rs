//! `PaddedPartition`: one subdomain's dense storage, interior plus halo.
//!
//! The partition owns a flat buffer of `product(interior + 2*padding)` cells.
//! Interior cells live at positions `[0, interior)`; halo cells at negative
//! positions and positions past the interior, out to the padding width. Every
//! position in `[-padding, interior + padding)` maps to exactly one buffer
//! slot.
//!
//! Sign convention, applied uniformly (verified by the end-to-end exchange
//! test rather than per-call): `halo_region(d)` is the slab *outside* the
//! interior on side `d`, filled from the `+d` neighbour; `boundary_region(d)`
//! is the slab just *inside* the interior edge on side `d`, the data this
//! partition sends so that same neighbour can fill its `-d` halo.

use crate::data::block::GridBlock;
use crate::grid_error::GridHaloError;
use crate::index::mapping::flatten;
use crate::index::range::PositionRange;
use crate::index::shape::{Extent, Position};
use crate::topology::direction::Direction;

/// Half-open bounds of a sub-box in partition coordinates.
pub type Bounds = (Position, Position);

/// Dense storage for one subdomain: interior block plus a halo layer of
/// fixed per-axis width on every side.
#[derive(Clone, Debug, PartialEq)]
pub struct PaddedPartition<T> {
    interior: Extent,
    padding: Extent,
    total: Extent,
    data: Vec<T>,
}

impl<T: Clone + Default> PaddedPartition<T> {
    /// Allocate a partition with default-initialized cells.
    ///
    /// # Errors
    /// Returns `RankMismatch` if `interior` and `padding` disagree on rank.
    pub fn new(interior: Extent, padding: Extent) -> Result<Self, GridHaloError> {
        interior.check_rank(padding.rank())?;
        let total = Extent::new(
            interior
                .iter()
                .zip(padding.iter())
                .map(|(e, p)| e + 2 * p)
                .collect::<Vec<_>>(),
        );
        let data = vec![T::default(); total.volume()];
        Ok(PaddedPartition {
            interior,
            padding,
            total,
            data,
        })
    }

    /// Same-width padding on every axis.
    pub fn with_uniform_padding(interior: Extent, width: usize) -> Result<Self, GridHaloError> {
        let padding = Extent::new(vec![width; interior.rank()]);
        Self::new(interior, padding)
    }
}

impl<T> PaddedPartition<T> {
    #[inline]
    pub fn interior_extent(&self) -> &Extent {
        &self.interior
    }

    #[inline]
    pub fn padding(&self) -> &Extent {
        &self.padding
    }

    /// `interior + 2*padding` per axis.
    #[inline]
    pub fn total_extent(&self) -> &Extent {
        &self.total
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.interior.rank()
    }

    /// Buffer slot of `pos`, valid on `[-padding, interior + padding)`.
    fn storage_index(&self, pos: &Position) -> Result<usize, GridHaloError> {
        self.interior.check_rank(pos.rank())?;
        let shifted = Position::new(
            pos.iter()
                .zip(self.padding.iter())
                .map(|(c, p)| c + p as i64)
                .collect::<Vec<_>>(),
        );
        flatten(&self.total, &shifted).map_err(|_| GridHaloError::OutOfBounds {
            pos: pos.as_slice().to_vec(),
            extent: self.interior.as_slice().to_vec(),
        })
    }

    /// Element access by position, halo cells included.
    pub fn try_get(&self, pos: &Position) -> Result<&T, GridHaloError> {
        let idx = self.storage_index(pos)?;
        Ok(&self.data[idx])
    }

    pub fn try_get_mut(&mut self, pos: &Position) -> Result<&mut T, GridHaloError> {
        let idx = self.storage_index(pos)?;
        Ok(&mut self.data[idx])
    }

    pub fn try_set(&mut self, pos: &Position, value: T) -> Result<(), GridHaloError> {
        let idx = self.storage_index(pos)?;
        self.data[idx] = value;
        Ok(())
    }

    fn check_dir(&self, dir: &Direction) -> Result<(), GridHaloError> {
        self.interior.check_rank(dir.rank())
    }

    /// Interior bounds for a band signature.
    ///
    /// The zero direction covers the whole non-padded interior. A nonzero
    /// direction selects the band-product region: the padding-width edge band
    /// on every signed axis, the padded-away core span on every zero axis.
    /// Bands are clamped so they stay disjoint on axes shorter than twice the
    /// padding.
    pub fn interior_region(&self, dir: &Direction) -> Result<Bounds, GridHaloError> {
        self.check_dir(dir)?;
        if dir.is_zero() {
            return Ok((
                Position::zeros(self.rank()),
                self.interior.to_position(),
            ));
        }
        let mut begin = vec![0i64; self.rank()];
        let mut end = vec![0i64; self.rank()];
        for axis in 0..self.rank() {
            let e = self.interior[axis] as i64;
            let p = self.padding[axis] as i64;
            let low = p.min(e);
            let high = (e - p).max(low);
            let (b, x) = match dir.as_slice()[axis] {
                -1 => (0, low),
                0 => (low, high),
                _ => (high, e),
            };
            begin[axis] = b;
            end[axis] = x;
        }
        Ok((Position::new(begin), Position::new(end)))
    }

    /// The padding-width slab just outside the interior on side `dir`;
    /// the receive target for that direction's neighbour data.
    pub fn halo_region(&self, dir: &Direction) -> Result<Bounds, GridHaloError> {
        self.check_dir(dir)?;
        let mut begin = vec![0i64; self.rank()];
        let mut end = vec![0i64; self.rank()];
        for axis in 0..self.rank() {
            let e = self.interior[axis] as i64;
            let p = self.padding[axis] as i64;
            let (b, x) = match dir.as_slice()[axis] {
                -1 => (-p, 0),
                0 => (0, e),
                _ => (e, e + p),
            };
            begin[axis] = b;
            end[axis] = x;
        }
        Ok((Position::new(begin), Position::new(end)))
    }

    /// The padding-width slab just inside the interior edge on side `dir`;
    /// the data sent to satisfy that neighbour's opposite halo.
    pub fn boundary_region(&self, dir: &Direction) -> Result<Bounds, GridHaloError> {
        self.check_dir(dir)?;
        let mut begin = vec![0i64; self.rank()];
        let mut end = vec![0i64; self.rank()];
        for axis in 0..self.rank() {
            let e = self.interior[axis] as i64;
            let p = self.padding[axis] as i64;
            let (b, x) = match dir.as_slice()[axis] {
                -1 => (0, p.min(e)),
                0 => (0, e),
                _ => ((e - p).max(0), e),
            };
            begin[axis] = b;
            end[axis] = x;
        }
        Ok((Position::new(begin), Position::new(end)))
    }

    /// All interior positions in row-major order.
    pub fn interior_positions(&self) -> PositionRange {
        PositionRange::new(Position::zeros(self.rank()), self.interior.to_position())
            .expect("corners share the interior's rank")
    }
}

impl<T: Clone + Default> PaddedPartition<T> {
    /// Copy the sub-box `[begin, end)` out into an owned block.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` on a negative shape, `OutOfBounds` if any
    /// corner leaves the padded storage.
    pub fn get_slice(&self, begin: &Position, end: &Position) -> Result<GridBlock<T>, GridHaloError> {
        let shape = end.sub(begin)?;
        if shape.iter().any(|c| c < 0) {
            return Err(GridHaloError::DimensionMismatch {
                from: begin.as_slice().iter().map(|&c| c.unsigned_abs() as usize).collect(),
                to: end.as_slice().iter().map(|&c| c.unsigned_abs() as usize).collect(),
            });
        }
        let extent = shape.to_extent()?;
        let mut data = Vec::with_capacity(extent.volume());
        for pos in PositionRange::new(begin.clone(), end.clone())? {
            data.push(self.try_get(&pos)?.clone());
        }
        GridBlock::from_vec(extent, data)
    }

    /// Copy `block` into the sub-box starting at `to_begin`.
    ///
    /// # Errors
    /// Returns `RankMismatch`/`OutOfBounds` if the implied target box does
    /// not fit inside the padded storage.
    pub fn put_slice(&mut self, block: &GridBlock<T>, to_begin: &Position) -> Result<(), GridHaloError> {
        self.interior.check_rank(to_begin.rank())?;
        let end = to_begin.add(&block.extent().to_position())?;
        // Validate both corners up front so a failing put writes nothing.
        if !block.is_empty() {
            self.storage_index(to_begin)?;
            let last = Position::new(end.iter().map(|c| c - 1).collect::<Vec<_>>());
            self.storage_index(&last)?;
        }
        let targets = PositionRange::new(to_begin.clone(), end)?;
        for (pos, value) in targets.zip(block.as_slice().iter()) {
            self.try_set(&pos, value.clone())?;
        }
        Ok(())
    }

    /// Fill every cell of `[begin, end)` with copies of `value`.
    pub fn fill_region(
        &mut self,
        begin: &Position,
        end: &Position,
        value: T,
    ) -> Result<(), GridHaloError> {
        for pos in PositionRange::new(begin.clone(), end.clone())? {
            self.try_set(&pos, value.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(v: &[i64]) -> Direction {
        Direction::new(v.to_vec()).unwrap()
    }

    fn pos(v: &[i64]) -> Position {
        Position::new(v.to_vec())
    }

    fn part_2d() -> PaddedPartition<f64> {
        PaddedPartition::with_uniform_padding(Extent::new(vec![4, 3]), 1).unwrap()
    }

    #[test]
    fn total_extent_includes_padding() {
        let p = part_2d();
        assert_eq!(p.total_extent(), &Extent::new(vec![6, 5]));
    }

    #[test]
    fn halo_positions_are_addressable() {
        let mut p = part_2d();
        p.try_set(&pos(&[-1, -1]), 7.0).unwrap();
        p.try_set(&pos(&[4, 3]), 8.0).unwrap();
        assert_eq!(*p.try_get(&pos(&[-1, -1])).unwrap(), 7.0);
        assert_eq!(*p.try_get(&pos(&[4, 3])).unwrap(), 8.0);
        assert!(matches!(
            p.try_get(&pos(&[-2, 0])),
            Err(GridHaloError::OutOfBounds { .. })
        ));
        assert!(p.try_get(&pos(&[5, 0])).is_err());
    }

    #[test]
    fn every_padded_position_maps_to_one_slot() {
        let p = part_2d();
        let begin = pos(&[-1, -1]);
        let end = pos(&[5, 4]);
        let mut seen = std::collections::HashSet::new();
        for q in PositionRange::new(begin, end).unwrap() {
            assert!(seen.insert(p.storage_index(&q).unwrap()));
        }
        assert_eq!(seen.len(), p.total_extent().volume());
    }

    #[test]
    fn halo_and_boundary_slabs() {
        let p = part_2d();
        let plus_x = dir(&[1, 0]);
        assert_eq!(p.halo_region(&plus_x).unwrap(), (pos(&[4, 0]), pos(&[5, 3])));
        assert_eq!(
            p.boundary_region(&plus_x).unwrap(),
            (pos(&[3, 0]), pos(&[4, 3]))
        );
        let minus_y = dir(&[0, -1]);
        assert_eq!(
            p.halo_region(&minus_y).unwrap(),
            (pos(&[0, -1]), pos(&[4, 0]))
        );
        assert_eq!(
            p.boundary_region(&minus_y).unwrap(),
            (pos(&[0, 0]), pos(&[4, 1]))
        );
        let corner = dir(&[1, 1]);
        assert_eq!(p.halo_region(&corner).unwrap(), (pos(&[4, 3]), pos(&[5, 4])));
    }

    #[test]
    fn zero_direction_is_whole_interior() {
        let p = part_2d();
        let z = Direction::zero(2);
        assert_eq!(p.interior_region(&z).unwrap(), (pos(&[0, 0]), pos(&[4, 3])));
        assert_eq!(p.halo_region(&z).unwrap(), (pos(&[0, 0]), pos(&[4, 3])));
    }

    #[test]
    fn slice_round_trip() {
        let mut p = part_2d();
        for (i, q) in p.interior_positions().enumerate() {
            p.try_set(&q, i as f64).unwrap();
        }
        let (b, e) = p.boundary_region(&dir(&[1, 0])).unwrap();
        let block = p.get_slice(&b, &e).unwrap();
        assert_eq!(block.extent(), &Extent::new(vec![1, 3]));

        let mut q = part_2d();
        let (hb, _) = q.halo_region(&dir(&[-1, 0])).unwrap();
        q.put_slice(&block, &hb).unwrap();
        assert_eq!(
            *q.try_get(&pos(&[-1, 0])).unwrap(),
            *p.try_get(&pos(&[3, 0])).unwrap()
        );
    }

    #[test]
    fn put_slice_past_storage_fails() {
        let mut p = part_2d();
        let block: GridBlock<f64> = GridBlock::new(Extent::new(vec![3, 3]));
        assert!(p.put_slice(&block, &pos(&[3, 0])).is_err());
    }

    #[test]
    fn fill_region_writes_every_cell() {
        let mut p = part_2d();
        let (b, e) = p.halo_region(&dir(&[-1, 0])).unwrap();
        p.fill_region(&b, &e, 2.5).unwrap();
        for y in 0..3 {
            assert_eq!(*p.try_get(&pos(&[-1, y])).unwrap(), 2.5);
        }
    }
}
