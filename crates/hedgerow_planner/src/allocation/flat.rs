//! Per-species percentage quotas without reconciliation against the position count.
use rand::RngCore;

use crate::allocation::pool::{assign_edges_then_inner, expand_by_percentage, repair_unassigned};
use crate::allocation::{GapHandling, PolicyOutcome, TypedSpecies};
use crate::lattice::PlantingPosition;
use crate::species::SpeciesCatalog;

pub(crate) fn allocate<R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    species: &TypedSpecies<'_>,
    catalog: &SpeciesCatalog,
    gap: GapHandling,
    rng: &mut R,
) -> PolicyOutcome {
    let total = positions.len();
    let tree_pool = expand_by_percentage(&species.trees, total);
    let shrub_pool = expand_by_percentage(&species.shrubs, total);

    assign_edges_then_inner(positions, tree_pool, shrub_pool, rng);

    let repaired = match gap {
        GapHandling::Report => 0,
        GapHandling::Repair => repair_unassigned(positions, catalog, rng),
    };

    PolicyOutcome {
        repaired,
        ..Default::default()
    }
}
