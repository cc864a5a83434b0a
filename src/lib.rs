//! # grid-halo
//!
//! grid-halo is a modular Rust library for structured-grid decomposition and halo exchange, designed as a building block for distributed stencil/PDE solvers. It splits a global N-dimensional grid into balanced subdomains, wires asynchronous point-to-point channels between neighbours, and drives race-free stencil update steps over padded local storage.
//!
//! ## Features
//! - Deterministic, near-cubical decomposition with per-axis periodicity
//! - Star and Box neighbour connectivity with stable direction slots
//! - Padded partitions with interior/boundary/halo sub-region addressing
//! - Step-tagged, waitable halo channels with a pluggable transport backend
//! - A stencil engine with injected operations and ping-pong buffering
//!
//! ## Determinism
//!
//! Decomposition selection, direction enumeration, and region partitioning
//! are pure functions of their inputs with documented tie-breaks, so
//! identical inputs always produce identical layouts and channel wiring.
//!
//! ## Usage
//! Add `grid-halo` as a dependency in your `Cargo.toml` and enable features
//! as needed:
//!
//! ```toml
//! [dependencies]
//! grid-halo = "0.3"
//! # Optional features:
//! # features = ["rayon-apply"]
//! ```

pub mod comm;
pub mod data;
pub mod grid_error;
pub mod index;
pub mod stencil;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::comm::channel::{HaloChannel, RecvHandle};
    pub use crate::comm::exchange::HaloExchange;
    pub use crate::comm::registry::ChannelRegistry;
    pub use crate::data::block::GridBlock;
    pub use crate::data::padded::PaddedPartition;
    pub use crate::grid_error::GridHaloError;
    pub use crate::index::range::PositionRange;
    pub use crate::index::shape::{Extent, Position};
    pub use crate::index::{flatten, multipliers, unflatten};
    pub use crate::stencil::engine::{BoundaryPolicy, StencilEngine};
    pub use crate::stencil::operation::StencilOp;
    pub use crate::stencil::region::{Region, create_regions};
    pub use crate::topology::decomposition::{Decomposition, SubdomainId};
    pub use crate::topology::direction::{Connectivity, Direction, enumerate, slot_index};
}
