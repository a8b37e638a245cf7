//! Global tree/shrub quotas, split evenly per species, with a repair pass.
use rand::RngCore;

use crate::allocation::pool::{assign_edges_then_inner, expand_evenly, quota, repair_unassigned};
use crate::allocation::{PolicyOutcome, TypedSpecies};
use crate::lattice::PlantingPosition;
use crate::species::SpeciesCatalog;

pub(crate) fn allocate<R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    species: &TypedSpecies<'_>,
    catalog: &SpeciesCatalog,
    tree_percentage: f64,
    shrub_percentage: Option<f64>,
    rng: &mut R,
) -> PolicyOutcome {
    let total = positions.len();
    let tree_quota = quota(total, tree_percentage);
    let shrub_quota = shrub_percentage
        .map(|pct| quota(total, pct))
        .unwrap_or(total - tree_quota);

    let tree_pool = expand_evenly(&species.trees, tree_quota);
    let shrub_pool = expand_evenly(&species.shrubs, shrub_quota);
    assign_edges_then_inner(positions, tree_pool, shrub_pool, rng);

    let repaired = repair_unassigned(positions, catalog, rng);

    PolicyOutcome {
        repaired,
        tree_quota: Some(tree_quota),
        ..Default::default()
    }
}
