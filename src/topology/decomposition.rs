//! Splitting a global grid into a grid of subdomains.
//!
//! A [`Decomposition`] is computed once from the global parameters and is
//! read-only afterwards. It answers three questions for any subdomain id:
//! how big is it ([`local_extent`](Decomposition::local_extent)), where does
//! it sit in the global grid ([`offset`](Decomposition::offset)), and who is
//! next to it ([`neighbour`](Decomposition::neighbour)), honouring per-axis
//! periodicity.
//!
//! Uneven splits are absorbed entirely by the subdomain that is last along
//! each axis, never distributed. Offset and neighbour arithmetic depend on
//! this policy; do not change it in isolation.

use crate::grid_error::GridHaloError;
use crate::index::mapping::{flatten, unflatten};
use crate::index::shape::{Extent, Position};
use crate::topology::direction::Direction;
use itertools::Itertools;
use std::fmt;

/// Integer handle of one subdomain, in `[0, subdomain_count)`.
///
/// Maps bijectively to an N-tuple of subdomain coordinates via row-major
/// flatten/unflatten using the split factors as the extent.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct SubdomainId(usize);

impl SubdomainId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        SubdomainId(raw)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubdomainId").field(&self.0).finish()
    }
}

impl fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic, balanced decomposition of a global grid.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Decomposition {
    global_extent: Extent,
    factors: Vec<usize>,
    periodicity: Vec<bool>,
}

impl Decomposition {
    /// Split `global_extent` into `subdomain_count` subdomains.
    ///
    /// Enumerates every axis-wise factorization of `subdomain_count` whose
    /// factors fit the grid (`factor[i] <= global_extent[i]`) and selects the
    /// one minimizing the total pairwise absolute difference between the
    /// per-axis base local extents, i.e. the most nearly cubical subdomains.
    /// Factorizations are enumerated with ascending factors per axis; ties go
    /// to the first enumerated, so identical inputs always yield identical
    /// factors.
    ///
    /// # Errors
    /// Returns `SplitInfeasible` if no factorization fits, `RankMismatch` if
    /// `periodicity` disagrees with the extent's rank.
    pub fn split(
        global_extent: Extent,
        subdomain_count: usize,
        periodicity: Vec<bool>,
    ) -> Result<Self, GridHaloError> {
        global_extent.check_rank(periodicity.len())?;
        if subdomain_count == 0 || global_extent.iter().any(|e| e == 0) {
            return Err(GridHaloError::SplitInfeasible {
                count: subdomain_count,
                extent: global_extent.as_slice().to_vec(),
            });
        }
        let mut best: Option<(usize, Vec<usize>)> = None;
        let mut candidate = vec![1usize; global_extent.rank()];
        enumerate_factorizations(
            subdomain_count,
            &global_extent,
            0,
            &mut candidate,
            &mut |factors| {
                let cost = imbalance(&global_extent, factors);
                // Strict inequality keeps the first enumerated on ties.
                if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                    best = Some((cost, factors.to_vec()));
                }
            },
        );
        let (cost, factors) = best.ok_or_else(|| GridHaloError::SplitInfeasible {
            count: subdomain_count,
            extent: global_extent.as_slice().to_vec(),
        })?;
        log::debug!(
            "split: extent {:?} x {} subdomains -> factors {:?} (imbalance {})",
            global_extent.as_slice(),
            subdomain_count,
            factors,
            cost
        );
        Ok(Decomposition {
            global_extent,
            factors,
            periodicity,
        })
    }

    /// Build a decomposition from explicit per-axis split factors.
    ///
    /// # Errors
    /// Returns `SplitInfeasible` if any factor is zero or exceeds its axis
    /// extent, `RankMismatch` on rank disagreements.
    pub fn with_factors(
        global_extent: Extent,
        factors: Vec<usize>,
        periodicity: Vec<bool>,
    ) -> Result<Self, GridHaloError> {
        global_extent.check_rank(factors.len())?;
        global_extent.check_rank(periodicity.len())?;
        let fits = factors
            .iter()
            .zip(global_extent.iter())
            .all(|(&f, e)| f >= 1 && f <= e);
        if !fits {
            return Err(GridHaloError::SplitInfeasible {
                count: factors.iter().product(),
                extent: global_extent.as_slice().to_vec(),
            });
        }
        Ok(Decomposition {
            global_extent,
            factors,
            periodicity,
        })
    }

    #[inline]
    pub fn global_extent(&self) -> &Extent {
        &self.global_extent
    }

    #[inline]
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    #[inline]
    pub fn periodicity(&self) -> &[bool] {
        &self.periodicity
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.global_extent.rank()
    }

    /// Total number of subdomains, `product(factors)`.
    #[inline]
    pub fn subdomain_count(&self) -> usize {
        self.factors.iter().product()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SubdomainId> {
        (0..self.subdomain_count()).map(SubdomainId::new)
    }

    fn factor_extent(&self) -> Extent {
        Extent::new(self.factors.clone())
    }

    fn check_id(&self, id: SubdomainId) -> Result<(), GridHaloError> {
        let count = self.subdomain_count();
        if id.get() >= count {
            return Err(GridHaloError::InvalidId { id: id.get(), count });
        }
        Ok(())
    }

    /// Subdomain coordinates of `id` in the factor grid.
    pub fn coords(&self, id: SubdomainId) -> Result<Position, GridHaloError> {
        self.check_id(id)?;
        unflatten(&self.factor_extent(), id.get())
    }

    /// Subdomain id of the given factor-grid coordinates.
    pub fn id_of(&self, coords: &Position) -> Result<SubdomainId, GridHaloError> {
        flatten(&self.factor_extent(), coords).map(SubdomainId::new)
    }

    /// Interior extent of subdomain `id`.
    ///
    /// `global_extent / factors` per axis, plus the remainder on every axis
    /// added only to the subdomain whose coordinate is last along that axis.
    pub fn local_extent(&self, id: SubdomainId) -> Result<Extent, GridHaloError> {
        let coords = self.coords(id)?;
        let axes = (0..self.rank())
            .map(|axis| {
                let base = self.global_extent[axis] / self.factors[axis];
                let last = coords[axis] as usize == self.factors[axis] - 1;
                if last {
                    base + self.global_extent[axis] % self.factors[axis]
                } else {
                    base
                }
            })
            .collect_vec();
        Ok(Extent::new(axes))
    }

    /// Global position of subdomain `id`'s first interior cell.
    pub fn offset(&self, id: SubdomainId) -> Result<Position, GridHaloError> {
        let coords = self.coords(id)?;
        let axes = (0..self.rank())
            .map(|axis| (self.global_extent[axis] / self.factors[axis]) as i64 * coords[axis])
            .collect_vec();
        Ok(Position::new(axes))
    }

    /// Translate a local interior position of `id` to global coordinates.
    pub fn global_position(
        &self,
        id: SubdomainId,
        local: &Position,
    ) -> Result<Position, GridHaloError> {
        self.offset(id)?.add(local)
    }

    /// The neighbouring subdomain of `id` along `dir`, or `None` when the
    /// edge leaves a non-periodic boundary.
    ///
    /// Periodic axes wrap modulo the factor count, so a single periodic
    /// subdomain is its own neighbour on both sides.
    ///
    /// # Errors
    /// Returns `InvalidId` for out-of-range ids and `RankMismatch` if `dir`
    /// has the wrong rank.
    pub fn neighbour(
        &self,
        id: SubdomainId,
        dir: &Direction,
    ) -> Result<Option<SubdomainId>, GridHaloError> {
        let coords = self.coords(id)?;
        self.global_extent.check_rank(dir.rank())?;
        let mut shifted = vec![0i64; self.rank()];
        for axis in 0..self.rank() {
            let factor = self.factors[axis] as i64;
            let c = coords[axis] + dir.as_slice()[axis];
            if c < 0 || c >= factor {
                if !self.periodicity[axis] {
                    return Ok(None);
                }
                shifted[axis] = c.rem_euclid(factor);
            } else {
                shifted[axis] = c;
            }
        }
        self.id_of(&Position::new(shifted)).map(Some)
    }
}

/// Total pairwise absolute difference between per-axis base local extents.
fn imbalance(extent: &Extent, factors: &[usize]) -> usize {
    let locals = factors
        .iter()
        .zip(extent.iter())
        .map(|(&f, e)| e / f)
        .collect_vec();
    let mut cost = 0usize;
    for i in 0..locals.len() {
        for j in i + 1..locals.len() {
            cost += locals[i].abs_diff(locals[j]);
        }
    }
    cost
}

/// Visit every tuple of per-axis factors whose product is `count` and whose
/// factors fit `extent`. Factors are chosen ascending per axis, first axis
/// outermost, which fixes the tie-break order of [`Decomposition::split`].
fn enumerate_factorizations(
    count: usize,
    extent: &Extent,
    axis: usize,
    candidate: &mut Vec<usize>,
    visit: &mut impl FnMut(&[usize]),
) {
    if axis == extent.rank() {
        if count == 1 {
            visit(candidate);
        }
        return;
    }
    for f in 1..=count.min(extent[axis]) {
        if count % f != 0 {
            continue;
        }
        candidate[axis] = f;
        enumerate_factorizations(count / f, extent, axis + 1, candidate, visit);
    }
    candidate[axis] = 1;
}
