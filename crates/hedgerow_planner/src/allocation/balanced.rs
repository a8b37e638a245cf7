//! Per-group tree shares with shrub-only edges and clustered shrubs.
use std::collections::BTreeMap;

use rand::RngCore;
use tracing::debug;

use crate::allocation::cluster::Clusterer;
use crate::allocation::pool::{expand_evenly, quota, split_evenly, CyclingPool};
use crate::allocation::{ClusterRange, PolicyOutcome, TypedSpecies};
use crate::lattice::PlantingPosition;
use crate::random::shuffle;

pub(crate) fn allocate<R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    species: &TypedSpecies<'_>,
    tree_percentage: f64,
    clusters: ClusterRange,
    rng: &mut R,
) -> PolicyOutcome {
    let total = positions.len();
    let tree_quota = quota(total, tree_percentage);

    // group -> row -> indices, all in generation order.
    let mut groups: BTreeMap<usize, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
    for (i, p) in positions.iter().enumerate() {
        groups
            .entry(p.group_id)
            .or_default()
            .entry(p.row)
            .or_default()
            .push(i);
    }
    let shares: BTreeMap<usize, usize> = groups
        .keys()
        .copied()
        .zip(split_evenly(tree_quota, groups.len()))
        .collect();

    let shrub_pool = CyclingPool::shuffled(
        expand_evenly(&species.shrubs, total - tree_quota),
        &species.shrubs,
        rng,
    );
    let mut trees = CyclingPool::shuffled(
        expand_evenly(&species.trees, tree_quota),
        &species.trees,
        rng,
    );
    let mut clusterer = Clusterer::new(clusters, shrub_pool);

    let mut global_remaining = tree_quota;
    let mut shortfall = 0;
    for (group_id, rows) in groups {
        let share = shares.get(&group_id).copied().unwrap_or(0);
        let mut group_remaining = share;
        for (_, mut row) in rows {
            shuffle(&mut row, rng);
            let mut rest = Vec::with_capacity(row.len());
            for i in row {
                if !positions[i].is_edge() && group_remaining > 0 && global_remaining > 0 {
                    if let Some(spec) = trees.next() {
                        positions[i].assign(&spec.name, spec.plant_type, 0);
                        group_remaining -= 1;
                        global_remaining -= 1;
                        continue;
                    }
                }
                rest.push(i);
            }
            // A tree closes a cluster: cluster each unbroken run separately.
            rest.sort_unstable();
            for run in rest.chunk_by(|a, b| *b == *a + 1) {
                clusterer.assign_runs(positions, run, rng);
            }
        }
        if group_remaining > 0 {
            debug!(
                "Group {} placed {} of {} trees.",
                group_id,
                share - group_remaining,
                share
            );
            shortfall += group_remaining;
        }
    }

    PolicyOutcome {
        tree_quota: Some(tree_quota),
        trees_per_group: shares,
        tree_shortfall: shortfall,
        clusters: clusterer.clusters_created(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use geo::{line_string, LineString};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::allocation::{allocate, AllocationConfig, AllocationPolicy, ClusterRange};
    use crate::lattice::polyline::HedgerowLayer;
    use crate::lattice::{generate_lattice, Lattice, LatticeConfig};
    use crate::species::{PlantType, SpeciesCatalog};

    fn segment(y: f64, length: f64) -> LineString<f64> {
        line_string![(x: 0.0, y: y), (x: length, y: y)]
    }

    fn three_groups() -> Lattice {
        let layer = HedgerowLayer::new(vec![
            segment(0.0, 20.0).into(),
            segment(50.0, 13.0).into(),
            segment(100.0, 7.0).into(),
        ]);
        generate_lattice(&layer, &LatticeConfig::new(5, 1.25, 1.0)).unwrap()
    }

    fn policy(tree_percentage: f64) -> AllocationConfig {
        AllocationConfig::new(AllocationPolicy::BalancedClusters {
            tree_percentage,
            clusters: ClusterRange::new(2, 5),
        })
    }

    fn trees_by_group(l: &Lattice) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        for p in l.positions.iter().filter(|p| p.plant_type == PlantType::Tree) {
            *counts.entry(p.group_id).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn each_group_receives_exactly_its_share() {
        let mut l = three_groups();
        assert_eq!(l.len(), 200);
        let report = allocate(
            &mut l,
            &SpeciesCatalog::native_hedgerow(),
            &policy(30.0),
            &mut StdRng::seed_from_u64(77),
        )
        .unwrap();

        // 60 trees over 3 groups.
        assert_eq!(report.tree_quota, Some(60));
        assert_eq!(
            report.trees_per_group,
            BTreeMap::from([(0, 20), (1, 20), (2, 20)])
        );
        assert_eq!(report.trees_per_group.values().sum::<usize>(), 60);
        assert_eq!(report.tree_shortfall, 0);

        let counts = trees_by_group(&l);
        for (g, &share) in &report.trees_per_group {
            assert_eq!(counts.get(g).copied().unwrap_or(0), share, "group {g}");
        }
        assert_eq!(report.trees, 60);
        assert_eq!(report.edge_trees, 0);
        assert!(report.is_complete());
    }

    #[test]
    fn remainder_goes_to_the_first_groups() {
        let mut l = three_groups();
        let report = allocate(
            &mut l,
            &SpeciesCatalog::native_hedgerow(),
            &policy(31.0),
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();

        // 62 trees: 21, 21, 20.
        assert_eq!(
            report.trees_per_group,
            BTreeMap::from([(0, 21), (1, 21), (2, 20)])
        );
        let counts = trees_by_group(&l);
        assert_eq!(counts[&0], 21);
        assert_eq!(counts[&1], 21);
        assert_eq!(counts[&2], 20);
    }

    #[test]
    fn exact_shares_across_many_seeds_and_group_counts() {
        for groups in 1..=6 {
            let features = (0..groups)
                .map(|g| segment(g as f64 * 40.0, 9.0 + g as f64 * 4.0).into())
                .collect();
            let layer = HedgerowLayer::new(features);
            for seed in 0..10 {
                let mut l = generate_lattice(&layer, &LatticeConfig::new(6, 1.0, 1.0)).unwrap();
                let report = allocate(
                    &mut l,
                    &SpeciesCatalog::native_hedgerow(),
                    &policy(17.0),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
                let quota = report.tree_quota.unwrap();
                assert_eq!(report.trees_per_group.values().sum::<usize>(), quota);
                assert_eq!(report.trees, quota);
                let counts = trees_by_group(&l);
                for (g, &share) in &report.trees_per_group {
                    assert_eq!(counts.get(g).copied().unwrap_or(0), share);
                }
            }
        }
    }

    #[test]
    fn edges_and_overflow_are_clustered_shrubs() {
        let mut l = three_groups();
        allocate(
            &mut l,
            &SpeciesCatalog::native_hedgerow(),
            &policy(10.0),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();

        for p in &l.positions {
            match p.plant_type {
                PlantType::Tree => {
                    assert!(!p.is_edge());
                    assert_eq!(p.cluster_id, 0);
                }
                PlantType::Shrub => assert!(p.cluster_id > 0),
                PlantType::Unassigned => panic!("position {} unassigned", p.id),
            }
        }

        // Clusters never span two rows or two groups.
        let mut seen: HashMap<u32, (usize, usize)> = HashMap::new();
        for p in l.positions.iter().filter(|p| p.cluster_id > 0) {
            let key = seen.entry(p.cluster_id).or_insert((p.group_id, p.row));
            assert_eq!(*key, (p.group_id, p.row));
        }
    }

    #[test]
    fn narrow_groups_report_a_shortfall() {
        // Two rows: no inner positions at all.
        let layer = HedgerowLayer::new(vec![segment(0.0, 10.0).into()]);
        let mut l = generate_lattice(&layer, &LatticeConfig::new(2, 1.0, 1.0)).unwrap();
        let report = allocate(
            &mut l,
            &SpeciesCatalog::native_hedgerow(),
            &policy(30.0),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(report.tree_quota, Some(6));
        assert_eq!(report.trees, 0);
        assert_eq!(report.tree_shortfall, 6);
        assert!(report.is_complete());
    }

    #[test]
    fn clusters_are_unbroken_runs_within_a_row() {
        let layer = HedgerowLayer::new(vec![segment(0.0, 30.0).into()]);
        for seed in 0..20 {
            let mut l = generate_lattice(&layer, &LatticeConfig::new(3, 1.0, 1.0)).unwrap();
            allocate(
                &mut l,
                &SpeciesCatalog::native_hedgerow(),
                &AllocationConfig::new(AllocationPolicy::BalancedClusters {
                    tree_percentage: 20.0,
                    clusters: ClusterRange::new(3, 5),
                }),
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();

            let mut members: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
            for (i, p) in l.positions.iter().enumerate() {
                if p.cluster_id > 0 {
                    members.entry(p.cluster_id).or_default().push(i);
                }
            }
            for (id, indices) in &members {
                let first = indices[0];
                let last = indices[indices.len() - 1];
                assert_eq!(last - first + 1, indices.len(), "seed {seed} cluster {id}");
                assert!(indices
                    .iter()
                    .all(|&i| l.positions[i].row == l.positions[first].row));
                assert!(indices.len() <= 5);

                // A short cluster ends at a tree or at the end of its row.
                if indices.len() < 3 {
                    let next = l.positions.get(last + 1);
                    assert!(next.is_none_or(|n| {
                        n.row != l.positions[last].row || n.plant_type == PlantType::Tree
                    }));
                }
            }
        }
    }

    #[test]
    fn shares_are_keyed_by_group_id() {
        // The middle feature has zero length and produces no positions.
        let layer = HedgerowLayer::new(vec![
            segment(0.0, 20.0).into(),
            line_string![(x: 5.0, y: 50.0), (x: 5.0, y: 50.0)].into(),
            segment(100.0, 10.0).into(),
        ]);
        let mut l = generate_lattice(&layer, &LatticeConfig::new(5, 1.25, 1.0)).unwrap();
        assert_eq!(l.len(), 150);
        let report = allocate(
            &mut l,
            &SpeciesCatalog::native_hedgerow(),
            &policy(20.0),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();

        assert_eq!(report.trees_per_group, BTreeMap::from([(0, 15), (2, 15)]));
        let counts = trees_by_group(&l);
        assert_eq!(counts.get(&1), None);
        assert_eq!(counts[&2], 15);
    }
}
