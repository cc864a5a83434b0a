//! Name-keyed channel registry, the handle the transport layer supplies.
//!
//! Subdomains wire their halo edges by symbolic name: the sender registers an
//! endpoint named for `(its id, direction slot)` and the receiver finds the
//! same name from the neighbour's side. Registration order between the two
//! sides is unconstrained, so [`endpoint`](ChannelRegistry::endpoint) creates
//! the channel on first touch and returns a clone on every later one.

use crate::comm::channel::HaloChannel;
use dashmap::DashMap;
use std::sync::Arc;

/// Shared, concurrent map from symbolic endpoint names to channels.
#[derive(Debug)]
pub struct ChannelRegistry<T> {
    channels: DashMap<String, HaloChannel<T>>,
}

impl<T: Send + 'static> ChannelRegistry<T> {
    /// A fresh registry, typically shared via `Arc` across subdomain tasks.
    pub fn new() -> Arc<Self> {
        Arc::new(ChannelRegistry {
            channels: DashMap::new(),
        })
    }

    /// Register `name`, creating the channel if it does not exist yet, and
    /// return an endpoint handle. Idempotent: both sides of an edge may call
    /// it in any order and get handles to the same channel.
    pub fn endpoint(&self, name: &str) -> HaloChannel<T> {
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| HaloChannel::new(name.to_string()))
            .clone()
    }

    /// Look up a previously registered channel.
    pub fn find(&self, name: &str) -> Option<HaloChannel<T>> {
        self.channels.get(name).map(|c| c.clone())
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
