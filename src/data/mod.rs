//! Data module: padded subdomain storage and the blocks shipped between them.

pub mod block;
pub mod padded;

pub use block::GridBlock;
pub use padded::{Bounds, PaddedPartition};
