//! `GridBlock`: an owned, dense N-dimensional sub-box.
//!
//! Blocks are what [`get_slice`](crate::data::padded::PaddedPartition::get_slice)
//! extracts and what halo channels carry. They are serde-derived so a wire
//! backend can ship them without touching the core.

use crate::grid_error::GridHaloError;
use crate::index::mapping::flatten;
use crate::index::range::PositionRange;
use crate::index::shape::{Extent, Position};

/// A dense box of values with its own extent, row-major layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridBlock<T> {
    extent: Extent,
    data: Vec<T>,
}

impl<T: Clone + Default> GridBlock<T> {
    /// A block of the given extent filled with `T::default()`.
    pub fn new(extent: Extent) -> Self {
        let data = vec![T::default(); extent.volume()];
        GridBlock { extent, data }
    }

    /// A block filled with copies of `value`.
    pub fn filled(extent: Extent, value: T) -> Self {
        let data = vec![value; extent.volume()];
        GridBlock { extent, data }
    }
}

impl<T> GridBlock<T> {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `data.len() != extent.volume()`.
    pub fn from_vec(extent: Extent, data: Vec<T>) -> Result<Self, GridHaloError> {
        if data.len() != extent.volume() {
            return Err(GridHaloError::DimensionMismatch {
                from: vec![data.len()],
                to: extent.as_slice().to_vec(),
            });
        }
        Ok(GridBlock { extent, data })
    }

    #[inline]
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at a block-local position, origin at the block's lower corner.
    pub fn try_get(&self, pos: &Position) -> Result<&T, GridHaloError> {
        let idx = flatten(&self.extent, pos)?;
        Ok(&self.data[idx])
    }

    pub fn try_set(&mut self, pos: &Position, value: T) -> Result<(), GridHaloError> {
        let idx = flatten(&self.extent, pos)?;
        self.data[idx] = value;
        Ok(())
    }

    /// `(position, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        let range = PositionRange::new(
            Position::zeros(self.extent.rank()),
            self.extent.to_position(),
        )
        .expect("corners share the extent's rank");
        range.zip(self.data.iter())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_default_filled() {
        let b: GridBlock<f64> = GridBlock::new(Extent::new(vec![2, 3]));
        assert_eq!(b.len(), 6);
        assert!(b.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_checks_volume() {
        assert!(GridBlock::from_vec(Extent::new(vec![2, 2]), vec![1, 2, 3]).is_err());
        let b = GridBlock::from_vec(Extent::new(vec![2, 2]), vec![1, 2, 3, 4]).unwrap();
        assert_eq!(*b.try_get(&Position::new(vec![1, 0])).unwrap(), 3);
    }

    #[test]
    fn set_then_get() {
        let mut b: GridBlock<i32> = GridBlock::new(Extent::new(vec![3]));
        b.try_set(&Position::new(vec![2]), 9).unwrap();
        assert_eq!(*b.try_get(&Position::new(vec![2])).unwrap(), 9);
        assert!(b.try_get(&Position::new(vec![3])).is_err());
    }

    #[test]
    fn iter_positions_match_layout() {
        let b = GridBlock::from_vec(Extent::new(vec![2, 2]), vec![10, 11, 12, 13]).unwrap();
        let collected: Vec<_> = b.iter().map(|(p, &v)| (p.as_slice().to_vec(), v)).collect();
        assert_eq!(
            collected,
            vec![
                (vec![0, 0], 10),
                (vec![0, 1], 11),
                (vec![1, 0], 12),
                (vec![1, 1], 13),
            ]
        );
    }

    #[test]
    fn serde_roundtrip() {
        let b = GridBlock::from_vec(Extent::new(vec![2]), vec![1.5f64, 2.5]).unwrap();
        let s = serde_json::to_string(&b).unwrap();
        let back: GridBlock<f64> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, b);
    }
}
