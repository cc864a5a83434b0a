//! Index arithmetic: extents, positions, row-major flattening, and
//! N-dimensional range iteration.

pub mod mapping;
pub mod range;
pub mod shape;

pub use mapping::{flatten, multipliers, unflatten};
pub use range::PositionRange;
pub use shape::{Extent, Position};
