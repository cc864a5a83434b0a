//! Top-level module for subdomain topology.
//!
//! This module provides the read-only view of how the global grid is split:
//! - Direction vectors and their enumeration per connectivity model
//! - The deterministic decomposition into subdomains, with per-axis
//!   periodicity and neighbour lookup
//!
//! Most users construct a [`Decomposition`] once at startup and query it from
//! every subdomain afterwards.

pub mod decomposition;
pub mod direction;

pub use decomposition::{Decomposition, SubdomainId};
pub use direction::{Connectivity, Direction, enumerate, slot_index};
