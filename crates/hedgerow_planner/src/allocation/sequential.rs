//! Shrub clusters in generation order, trees filling the tail.
use rand::RngCore;

use crate::allocation::cluster::Clusterer;
use crate::allocation::pool::{expand_evenly, quota, CyclingPool};
use crate::allocation::{ClusterRange, PolicyOutcome, TypedSpecies};
use crate::lattice::PlantingPosition;

pub(crate) fn allocate<R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    species: &TypedSpecies<'_>,
    tree_percentage: f64,
    clusters: ClusterRange,
    rng: &mut R,
) -> PolicyOutcome {
    let total = positions.len();
    let tree_quota = quota(total, tree_percentage);
    let shrub_budget = total - tree_quota;

    let shrub_pool = CyclingPool::shuffled(
        expand_evenly(&species.shrubs, shrub_budget),
        &species.shrubs,
        rng,
    );
    let mut trees = CyclingPool::shuffled(
        expand_evenly(&species.trees, tree_quota),
        &species.trees,
        rng,
    );

    let mut clusterer = Clusterer::new(clusters, shrub_pool);
    let clustered: Vec<usize> = (0..shrub_budget).collect();
    clusterer.assign_runs(positions, &clustered, rng);

    for p in &mut positions[shrub_budget..] {
        if let Some(spec) = trees.next() {
            p.assign(&spec.name, spec.plant_type, 0);
        }
    }

    PolicyOutcome {
        tree_quota: Some(tree_quota),
        clusters: clusterer.clusters_created(),
        ..Default::default()
    }
}
