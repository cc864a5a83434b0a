//! Per-subdomain communicator set: one channel pair per real neighbour.
//!
//! Wiring convention: subdomain `id` *sends* on the endpoint named for
//! `(id, slot(dir))` and *receives* its `dir` halo from the endpoint named
//! for `(neighbour, slot(-dir))`: what one side sends "north" the other
//! finds under its own id as "south". Directions without a neighbour get no
//! channel at all.

use crate::comm::channel::{HaloChannel, RecvHandle};
use crate::comm::registry::ChannelRegistry;
use crate::data::block::GridBlock;
use crate::grid_error::GridHaloError;
use crate::topology::decomposition::{Decomposition, SubdomainId};
use crate::topology::direction::{Connectivity, Direction, enumerate, slot_index};
use std::sync::Arc;

/// Symbolic endpoint name of the send side of `(id, slot)`.
fn endpoint_name(id: SubdomainId, slot: usize) -> String {
    format!("halo/{}/{}", id.get(), slot)
}

/// The fixed set of halo channels owned by one subdomain.
pub struct HaloExchange<T> {
    id: SubdomainId,
    connectivity: Connectivity,
    directions: Arc<Vec<Direction>>,
    /// Indexed by direction slot; `None` where there is no neighbour.
    send: Vec<Option<HaloChannel<T>>>,
    recv: Vec<Option<HaloChannel<T>>>,
}

impl<T: Send + 'static> HaloExchange<T> {
    /// Wire every direction of `connectivity` that has a neighbour under
    /// `decomp`, registering endpoints through `registry`.
    pub fn new(
        decomp: &Decomposition,
        id: SubdomainId,
        connectivity: Connectivity,
        registry: &ChannelRegistry<T>,
    ) -> Result<Self, GridHaloError> {
        let directions = enumerate(decomp.rank(), connectivity);
        let mut send = Vec::with_capacity(directions.len());
        let mut recv = Vec::with_capacity(directions.len());
        for (slot, dir) in directions.iter().enumerate() {
            match decomp.neighbour(id, dir)? {
                Some(nbr) => {
                    let back = slot_index(&dir.flip(), connectivity)?;
                    send.push(Some(registry.endpoint(&endpoint_name(id, slot))));
                    recv.push(Some(registry.endpoint(&endpoint_name(nbr, back))));
                    log::trace!(
                        "subdomain {id}: dir {:?} wired to neighbour {nbr}",
                        dir.as_slice()
                    );
                }
                None => {
                    send.push(None);
                    recv.push(None);
                }
            }
        }
        log::debug!(
            "subdomain {id}: {} of {} directions have neighbours",
            send.iter().flatten().count(),
            directions.len()
        );
        Ok(HaloExchange {
            id,
            connectivity,
            directions,
            send,
            recv,
        })
    }

    #[inline]
    pub fn id(&self) -> SubdomainId {
        self.id
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// The enumerated direction set this exchange was wired for.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    fn slot(&self, dir: &Direction) -> Result<usize, GridHaloError> {
        slot_index(dir, self.connectivity)
    }

    /// Whether `dir` has a real neighbour (and therefore a channel).
    pub fn has_neighbour(&self, dir: &Direction) -> bool {
        self.slot(dir)
            .map(|s| self.send[s].is_some())
            .unwrap_or(false)
    }

    /// Number of directions with a real neighbour.
    pub fn neighbour_count(&self) -> usize {
        self.send.iter().flatten().count()
    }

    /// Ship this subdomain's `dir`-side boundary data, tagged with `step`.
    ///
    /// # Errors
    /// `NoSuchNeighbour` when `dir` has no channel; `InvalidDirection` when
    /// `dir` is not in the enumeration; `ChannelFailure` from the transport.
    pub fn send(&self, dir: &Direction, block: GridBlock<T>, step: u64) -> Result<(), GridHaloError> {
        let slot = self.slot(dir)?;
        let channel = self.send[slot]
            .as_ref()
            .ok_or_else(|| GridHaloError::NoSuchNeighbour(dir.as_slice().to_vec()))?;
        channel.send(block, step)
    }

    /// A handle on the neighbour's boundary data for this subdomain's `dir`
    /// halo, tagged with `step`.
    pub fn recv(&self, dir: &Direction, step: u64) -> Result<RecvHandle<T>, GridHaloError> {
        let slot = self.slot(dir)?;
        let channel = self.recv[slot]
            .as_ref()
            .ok_or_else(|| GridHaloError::NoSuchNeighbour(dir.as_slice().to_vec()))?;
        Ok(channel.recv(step))
    }

    /// Drop every in-flight send of an aborted `step` so subsequent steps
    /// start from clean endpoints.
    pub fn discard_step(&self, step: u64) {
        for channel in self.send.iter().flatten() {
            channel.discard(step);
        }
    }
}

impl<T> std::fmt::Debug for HaloExchange<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HaloExchange")
            .field("id", &self.id)
            .field("connectivity", &self.connectivity)
            .field("neighbours", &self.send.iter().flatten().count())
            .finish()
    }
}
