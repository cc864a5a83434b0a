use grid_halo::index::{Extent, Position};
use grid_halo::topology::{Connectivity, Decomposition, Direction, SubdomainId, enumerate};
use std::collections::HashSet;

fn dir(v: &[i64]) -> Direction {
    Direction::new(v.to_vec()).unwrap()
}

#[test]
fn split_factors_multiply_to_count() {
    for count in 1..=12 {
        let d = Decomposition::split(Extent::new(vec![24, 24]), count, vec![false, false]).unwrap();
        assert_eq!(d.factors().iter().product::<usize>(), count);
        assert_eq!(d.subdomain_count(), count);
    }
}

#[test]
fn split_is_idempotent() {
    for count in [2, 3, 6, 8] {
        let a = Decomposition::split(Extent::new(vec![30, 20, 10]), count, vec![false; 3]).unwrap();
        let b = Decomposition::split(Extent::new(vec![30, 20, 10]), count, vec![false; 3]).unwrap();
        assert_eq!(a, b);
    }
}

/// Every global cell belongs to exactly one subdomain: offsets plus local
/// extents tile the global grid with no loss or duplication.
#[test]
fn subdomains_tile_the_global_grid() {
    let global = Extent::new(vec![11, 12]);
    let d = Decomposition::split(global.clone(), 6, vec![false, false]).unwrap();
    let mut owned = HashSet::new();
    for id in d.ids() {
        let off = d.offset(id).unwrap();
        let ext = d.local_extent(id).unwrap();
        for local in grid_halo::index::PositionRange::new(
            Position::zeros(2),
            ext.to_position(),
        )
        .unwrap()
        {
            let g = d.global_position(id, &local).unwrap();
            assert!(
                owned.insert(g.as_slice().to_vec()),
                "cell {:?} owned twice (offset {:?})",
                g.as_slice(),
                off.as_slice()
            );
        }
    }
    assert_eq!(owned.len(), global.volume());
}

#[test]
fn periodic_one_subdomain_is_its_own_neighbour() {
    let d = Decomposition::split(Extent::new(vec![10]), 1, vec![true]).unwrap();
    let id = SubdomainId::new(0);
    assert_eq!(d.neighbour(id, &dir(&[1])).unwrap(), Some(id));
    assert_eq!(d.neighbour(id, &dir(&[-1])).unwrap(), Some(id));
}

#[test]
fn non_periodic_edges_return_none() {
    let d = Decomposition::with_factors(
        Extent::new(vec![8, 8]),
        vec![2, 2],
        vec![false, false],
    )
    .unwrap();
    // Corner subdomain 0 has no neighbour toward either low side.
    let c0 = SubdomainId::new(0);
    assert_eq!(d.neighbour(c0, &dir(&[-1, 0])).unwrap(), None);
    assert_eq!(d.neighbour(c0, &dir(&[0, -1])).unwrap(), None);
    assert_eq!(d.neighbour(c0, &dir(&[-1, -1])).unwrap(), None);
    assert!(d.neighbour(c0, &dir(&[1, 1])).unwrap().is_some());
}

#[test]
fn periodic_axis_wraps_while_other_does_not() {
    let d = Decomposition::with_factors(
        Extent::new(vec![8, 8]),
        vec![2, 2],
        vec![true, false],
    )
    .unwrap();
    let c0 = SubdomainId::new(0);
    // Axis 0 wraps; axis 1 is a hard edge.
    assert_eq!(
        d.neighbour(c0, &dir(&[-1, 0])).unwrap(),
        Some(SubdomainId::new(2))
    );
    assert_eq!(d.neighbour(c0, &dir(&[0, -1])).unwrap(), None);
}

#[test]
fn neighbour_relation_is_symmetric() {
    let d = Decomposition::split(Extent::new(vec![12, 12]), 4, vec![true, false]).unwrap();
    for id in d.ids() {
        for dv in enumerate(2, Connectivity::Box).iter() {
            if let Some(nbr) = d.neighbour(id, dv).unwrap() {
                assert_eq!(
                    d.neighbour(nbr, &dv.flip()).unwrap(),
                    Some(id),
                    "asymmetric neighbour: {id} --{:?}--> {nbr}",
                    dv.as_slice()
                );
            }
        }
    }
}

#[test]
fn remainder_lands_on_far_edge_only() {
    let d = Decomposition::with_factors(Extent::new(vec![11, 12]), vec![3, 2], vec![false, false])
        .unwrap();
    // Axis 0: 11/3 = 3 base; last coordinate takes 3 + 2.
    for id in d.ids() {
        let coords = d.coords(id).unwrap();
        let ext = d.local_extent(id).unwrap();
        let expected_x = if coords[0] == 2 { 5 } else { 3 };
        assert_eq!(ext[0], expected_x);
        assert_eq!(ext[1], 6);
    }
}

#[test]
fn infeasible_counts_are_rejected() {
    // 7 subdomains cannot factor into a 2x3 grid.
    assert!(Decomposition::split(Extent::new(vec![2, 3]), 7, vec![false, false]).is_err());
    // Zero subdomains never make sense.
    assert!(Decomposition::split(Extent::new(vec![4]), 0, vec![false]).is_err());
}
