//! The stencil engine: halo fill, region partition, apply, swap.
//!
//! One engine drives one subdomain. Each update step runs the same state
//! machine: post boundary sends and halo receives for every direction with a
//! neighbour, fill the remaining halos from the boundary policy, wait the
//! receives in, then apply the combining function region by region into the
//! output buffer and swap. The input buffer is never mutated while it is
//! read, and a failed step never swaps, so callers cannot observe partial
//! output.

use crate::comm::channel::RecvHandle;
use crate::comm::exchange::HaloExchange;
use crate::comm::registry::ChannelRegistry;
use crate::data::padded::PaddedPartition;
use crate::grid_error::GridHaloError;
use crate::index::shape::Extent;
use crate::stencil::operation::StencilOp;
use crate::stencil::region::{Region, create_regions};
use crate::topology::decomposition::{Decomposition, SubdomainId};
use crate::topology::direction::{Connectivity, Direction};

/// What fills a halo that has no neighbour behind it.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryPolicy<T> {
    /// Fill the slab with copies of a constant.
    Constant(T),
}

/// Per-subdomain stencil driver; owns the ping-pong partition pair.
pub struct StencilEngine<T, Op> {
    decomp: Decomposition,
    id: SubdomainId,
    exchange: HaloExchange<T>,
    op: Op,
    boundary: BoundaryPolicy<T>,
    input: PaddedPartition<T>,
    output: PaddedPartition<T>,
    step: u64,
}

impl<T, Op> StencilEngine<T, Op>
where
    T: Clone + Default + Send + Sync + 'static,
    Op: StencilOp<T> + Sync,
{
    /// Build the engine for subdomain `id`, wiring its halo channels through
    /// `registry` and sizing both buffers from the decomposition. The halo
    /// width comes from the stencil operation itself.
    pub fn new(
        decomp: Decomposition,
        id: SubdomainId,
        connectivity: Connectivity,
        registry: &ChannelRegistry<T>,
        op: Op,
        boundary: BoundaryPolicy<T>,
    ) -> Result<Self, GridHaloError> {
        let exchange = HaloExchange::new(&decomp, id, connectivity, registry)?;
        let interior = decomp.local_extent(id)?;
        let width = op.padding();
        let input = PaddedPartition::with_uniform_padding(interior.clone(), width)?;
        let output = PaddedPartition::with_uniform_padding(interior, width)?;
        log::debug!(
            "engine for subdomain {id}: interior {:?}, halo width {width}, {} neighbours",
            input.interior_extent().as_slice(),
            exchange.neighbour_count()
        );
        Ok(StencilEngine {
            decomp,
            id,
            exchange,
            op,
            boundary,
            input,
            output,
            step: 0,
        })
    }

    #[inline]
    pub fn id(&self) -> SubdomainId {
        self.id
    }

    #[inline]
    pub fn decomposition(&self) -> &Decomposition {
        &self.decomp
    }

    /// The current input grid (the most recently completed state).
    #[inline]
    pub fn partition(&self) -> &PaddedPartition<T> {
        &self.input
    }

    /// Mutable access for initialization before the first step.
    #[inline]
    pub fn partition_mut(&mut self) -> &mut PaddedPartition<T> {
        &mut self.input
    }

    /// Steps completed so far; also the tag of the next exchange.
    #[inline]
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Run one update step.
    ///
    /// # Errors
    /// `ChannelFailure` aborts the step before any swap; the aborted step's
    /// in-flight sends are discarded so a retry (re-issuing the whole step)
    /// starts clean. All other errors indicate a configuration logic error.
    pub fn step(&mut self) -> Result<(), GridHaloError> {
        let step = self.step;
        match self.exchange_and_apply(step) {
            Ok(()) => {
                std::mem::swap(&mut self.input, &mut self.output);
                self.step += 1;
                Ok(())
            }
            Err(e) => {
                if matches!(e, GridHaloError::ChannelFailure { .. }) {
                    self.exchange.discard_step(step);
                }
                Err(e)
            }
        }
    }

    /// Run `steps` consecutive update steps.
    pub fn run(&mut self, steps: u64) -> Result<(), GridHaloError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    fn exchange_and_apply(&mut self, step: u64) -> Result<(), GridHaloError> {
        let directions: Vec<Direction> = self.exchange.directions().to_vec();

        // Phase 1: post all sends and receives, fill physical boundaries.
        let mut pending: Vec<(Direction, RecvHandle<T>)> = Vec::new();
        for dir in &directions {
            if self.exchange.has_neighbour(dir) {
                let (b, e) = self.input.boundary_region(dir)?;
                let block = self.input.get_slice(&b, &e)?;
                self.exchange.send(dir, block, step)?;
                pending.push((dir.clone(), self.exchange.recv(dir, step)?));
            } else {
                let (b, e) = self.input.halo_region(dir)?;
                match &self.boundary {
                    BoundaryPolicy::Constant(v) => {
                        self.input.fill_region(&b, &e, v.clone())?;
                    }
                }
            }
        }
        log::trace!(
            "subdomain {} step {step}: {} halo receives posted",
            self.id,
            pending.len()
        );

        // Phase 2: wait the receives in and write the halos.
        for (dir, handle) in pending {
            let block = handle.wait()?;
            let (hb, he) = self.input.halo_region(&dir)?;
            let shape = he.sub(&hb)?.to_extent()?;
            if block.extent() != &shape {
                return Err(GridHaloError::DimensionMismatch {
                    from: block.extent().as_slice().to_vec(),
                    to: shape.as_slice().to_vec(),
                });
            }
            self.input.put_slice(&block, &hb)?;
        }

        // Phase 3: apply the stencil region by region into the output.
        let regions = create_regions(
            self.input.interior_extent(),
            self.input.padding(),
            &directions,
        )?;
        debug_assert_eq!(
            regions.iter().map(Region::volume).sum::<usize>(),
            self.input.interior_extent().volume()
        );
        for region in &regions {
            self.apply_region(region)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "rayon-apply"))]
    fn apply_region(&mut self, region: &Region) -> Result<(), GridHaloError> {
        let mut gathered = Vec::with_capacity(self.op.offsets().len());
        for pos in region.positions() {
            gathered.clear();
            for offset in self.op.offsets() {
                let at = pos.add(offset)?;
                gathered.push(self.input.try_get(&at)?.clone());
            }
            self.output.try_set(&pos, self.op.combine(&gathered))?;
        }
        Ok(())
    }

    #[cfg(feature = "rayon-apply")]
    fn apply_region(&mut self, region: &Region) -> Result<(), GridHaloError> {
        use rayon::prelude::*;
        let input = &self.input;
        let op = &self.op;
        let positions: Vec<_> = region.positions().collect();
        let updates = positions
            .into_par_iter()
            .map(|pos| {
                let mut gathered = Vec::with_capacity(op.offsets().len());
                for offset in op.offsets() {
                    let at = pos.add(offset)?;
                    gathered.push(input.try_get(&at)?.clone());
                }
                Ok((pos, op.combine(&gathered)))
            })
            .collect::<Result<Vec<_>, GridHaloError>>()?;
        for (pos, value) in updates {
            self.output.try_set(&pos, value)?;
        }
        Ok(())
    }
}
