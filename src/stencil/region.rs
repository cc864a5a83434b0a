//! Partitioning the interior into independently computable regions.
//!
//! One update step splits the interior into a band-product decomposition:
//! every axis contributes a low edge band, a padded-away core band, and a
//! high edge band, and each region is one choice of band per axis. The core
//! region (all-zero signature) depends on no halo; an edge or corner region
//! depends on exactly the halo directions its cells can reach. The regions
//! cover every interior cell exactly once, a property tested directly in
//! `tests/region_partition.rs`.

use crate::grid_error::GridHaloError;
use crate::index::range::PositionRange;
use crate::index::shape::{Extent, Position};
use crate::topology::direction::{Connectivity, Direction, enumerate};

/// A contiguous sub-box of the interior plus the halo directions that must
/// be valid before it is computed. Recomputed freshly each step.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub begin: Position,
    pub end: Position,
    /// Halo directions this region reads through the stencil.
    pub dependencies: Vec<Direction>,
}

impl Region {
    /// Row-major walk over the region's positions.
    pub fn positions(&self) -> PositionRange {
        PositionRange::new(self.begin.clone(), self.end.clone())
            .expect("region corners share a rank")
    }

    pub fn volume(&self) -> usize {
        self.begin
            .iter()
            .zip(self.end.iter())
            .map(|(b, e)| (e - b).max(0) as usize)
            .product()
    }

    pub fn is_empty(&self) -> bool {
        self.volume() == 0
    }
}

/// Band-product partition of `[0, interior)` for the given padding.
///
/// `halo_dirs` is the enumerated direction set of the active connectivity;
/// each returned region's `dependencies` is the subset of those directions
/// its cells can reach through a `padding`-wide stencil, derived from the
/// region's geometry. Empty regions (axes shorter than twice the padding
/// collapse some bands) are dropped.
///
/// # Errors
/// Returns `RankMismatch` if `interior`, `padding`, or any direction
/// disagree on rank.
pub fn create_regions(
    interior: &Extent,
    padding: &Extent,
    halo_dirs: &[Direction],
) -> Result<Vec<Region>, GridHaloError> {
    interior.check_rank(padding.rank())?;
    for d in halo_dirs {
        interior.check_rank(d.rank())?;
    }
    let rank = interior.rank();
    // Every band signature, zero included: row-major over {-1,0,1}^rank.
    let mut signatures: Vec<Direction> = vec![Direction::zero(rank)];
    signatures.extend(enumerate(rank, Connectivity::Box).iter().cloned());

    let mut regions = Vec::new();
    for sig in signatures {
        let mut begin = vec![0i64; rank];
        let mut end = vec![0i64; rank];
        for axis in 0..rank {
            let e = interior[axis] as i64;
            let p = padding[axis] as i64;
            let low = p.min(e);
            let high = (e - p).max(low);
            let (b, x) = match sig.as_slice()[axis] {
                -1 => (0, low),
                0 => (low, high),
                _ => (high, e),
            };
            begin[axis] = b;
            end[axis] = x;
        }
        let region = Region {
            begin: Position::new(begin),
            end: Position::new(end),
            dependencies: Vec::new(),
        };
        if region.is_empty() {
            continue;
        }
        let dependencies = halo_dirs
            .iter()
            .filter(|d| region_touches_halo(&region, interior, padding, d))
            .cloned()
            .collect();
        regions.push(Region {
            dependencies,
            ..region
        });
    }
    Ok(regions)
}

/// Whether a `padding`-wide stencil read from inside `region` can land in
/// the halo slab on side `dir`.
fn region_touches_halo(region: &Region, interior: &Extent, padding: &Extent, dir: &Direction) -> bool {
    if dir.is_zero() {
        return false;
    }
    (0..interior.rank()).all(|axis| {
        let e = interior[axis] as i64;
        let p = padding[axis] as i64;
        match dir.as_slice()[axis] {
            -1 => region.begin[axis] < p,
            0 => true,
            _ => region.end[axis] > e - p,
        }
    })
}
