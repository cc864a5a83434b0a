//! Asynchronous point-to-point halo communication.
//!
//! Channels are a local interface with a pluggable backend: the in-memory
//! [`ChannelRegistry`] serves single-process runs, and a networked transport
//! can satisfy the same name-keyed contract without touching the engine.

pub mod channel;
pub mod exchange;
pub mod registry;

pub use channel::{HaloChannel, RecvHandle};
pub use exchange::HaloExchange;
pub use registry::ChannelRegistry;
