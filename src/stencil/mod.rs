//! Stencil application: the injected operation, region partitioning, and the
//! per-subdomain engine that ties decomposition, storage, and channels into
//! one update step.

pub mod engine;
pub mod operation;
pub mod region;

pub use engine::{BoundaryPolicy, StencilEngine};
pub use operation::StencilOp;
pub use region::{Region, create_regions};
