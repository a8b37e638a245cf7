//! Quota arithmetic and species pools shared by every allocation policy.
use rand::RngCore;

use crate::lattice::PlantingPosition;
use crate::random::{rand_index, shuffle};
use crate::species::{SpeciesCatalog, SpeciesSpec};

/// `floor(total * percentage / 100)`.
#[inline]
pub(crate) fn quota(total: usize, percentage: f64) -> usize {
    ((total as f64) * percentage / 100.0).floor().max(0.0) as usize
}

/// Splits `total` into `parts` shares that differ by at most one; the first
/// `total % parts` shares get the extra unit.
pub(crate) fn split_evenly(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let remainder = total % parts;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Each species repeated by its own percentage of `total`.
pub(crate) fn expand_by_percentage<'a>(
    species: &[&'a SpeciesSpec],
    total: usize,
) -> Vec<&'a SpeciesSpec> {
    species
        .iter()
        .flat_map(|s| std::iter::repeat(*s).take(quota(total, s.target_percentage)))
        .collect()
}

/// Each species repeated `type_quota / species.len()` times.
pub(crate) fn expand_evenly<'a>(
    species: &[&'a SpeciesSpec],
    type_quota: usize,
) -> Vec<&'a SpeciesSpec> {
    if species.is_empty() {
        return Vec::new();
    }
    let per_species = type_quota / species.len();
    species
        .iter()
        .flat_map(|s| std::iter::repeat(*s).take(per_species))
        .collect()
}

/// A shuffled pool consumed round-robin.
///
/// Falls back to cycling the plain species list when the pool is empty.
pub(crate) struct CyclingPool<'a> {
    items: Vec<&'a SpeciesSpec>,
    next: usize,
}

impl<'a> CyclingPool<'a> {
    pub(crate) fn shuffled<R: RngCore + ?Sized>(
        mut pool: Vec<&'a SpeciesSpec>,
        species: &[&'a SpeciesSpec],
        rng: &mut R,
    ) -> Self {
        if pool.is_empty() {
            pool = species.to_vec();
        } else {
            shuffle(&mut pool, rng);
        }
        Self {
            items: pool,
            next: 0,
        }
    }

    pub(crate) fn next(&mut self) -> Option<&'a SpeciesSpec> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items[self.next % self.items.len()];
        self.next += 1;
        Some(item)
    }
}

/// Edge positions take shrubs from `shrub_pool` in generation order; the leftover
/// shrubs and all trees are shuffled together and dealt to the inner positions.
///
/// Positions beyond the pools' combined size stay unassigned.
pub(crate) fn assign_edges_then_inner<'a, R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    tree_pool: Vec<&'a SpeciesSpec>,
    mut shrub_pool: Vec<&'a SpeciesSpec>,
    rng: &mut R,
) {
    let (edge, inner): (Vec<usize>, Vec<usize>) =
        (0..positions.len()).partition(|&i| positions[i].is_edge());

    shuffle(&mut shrub_pool, rng);
    for (&i, spec) in edge.iter().zip(&shrub_pool) {
        positions[i].assign(&spec.name, spec.plant_type, 0);
    }

    let leftover = shrub_pool.get(edge.len()..).unwrap_or(&[]);
    let mut inner_pool = tree_pool;
    inner_pool.extend_from_slice(leftover);
    shuffle(&mut inner_pool, rng);
    for (&i, spec) in inner.iter().zip(&inner_pool) {
        positions[i].assign(&spec.name, spec.plant_type, 0);
    }
}

/// Gives every unassigned position a uniformly drawn species; edge positions draw
/// from shrubs only. Returns the number of positions repaired.
pub(crate) fn repair_unassigned<R: RngCore + ?Sized>(
    positions: &mut [PlantingPosition],
    catalog: &SpeciesCatalog,
    rng: &mut R,
) -> usize {
    let all: Vec<&SpeciesSpec> = catalog.species().iter().collect();
    let shrubs = catalog.shrubs();
    let mut repaired = 0;
    for p in positions.iter_mut().filter(|p| !p.is_assigned()) {
        let candidates = if p.is_edge() { &shrubs } else { &all };
        if candidates.is_empty() {
            continue;
        }
        let spec = candidates[rand_index(rng, candidates.len())];
        p.assign(&spec.name, spec.plant_type, 0);
        repaired += 1;
    }
    repaired
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::lattice::row::classify_row;
    use crate::species::PlantType;

    fn catalog() -> SpeciesCatalog {
        SpeciesCatalog::try_new(vec![
            SpeciesSpec::tree("Oak", 20.0),
            SpeciesSpec::tree("Lime", 10.0),
            SpeciesSpec::shrub("Hazel", 35.0),
            SpeciesSpec::shrub("Rose", 35.0),
        ])
        .unwrap()
    }

    fn positions(rows: usize, per_row: usize) -> Vec<PlantingPosition> {
        (0..rows * per_row)
            .map(|i| {
                let row = i / per_row;
                PlantingPosition {
                    id: i + 1,
                    position: DVec2::new((i % per_row) as f64, row as f64),
                    row,
                    row_class: classify_row(row, rows),
                    group_id: 0,
                    species: None,
                    plant_type: PlantType::Unassigned,
                    cluster_id: 0,
                }
            })
            .collect()
    }

    #[test]
    fn quota_floors() {
        assert_eq!(quota(100, 30.0), 30);
        assert_eq!(quota(7, 50.0), 3);
        assert_eq!(quota(0, 80.0), 0);
        assert_eq!(quota(33, 3.0), 0);
    }

    #[test]
    fn split_evenly_distributes_remainder_to_first_parts() {
        assert_eq!(split_evenly(10, 3), vec![4, 3, 3]);
        assert_eq!(split_evenly(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_evenly(9, 3), vec![3, 3, 3]);
        assert!(split_evenly(5, 0).is_empty());
        for total in 0..50 {
            for parts in 1..9 {
                let shares = split_evenly(total, parts);
                assert_eq!(shares.iter().sum::<usize>(), total);
                let max = *shares.iter().max().unwrap();
                let min = *shares.iter().min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn expand_evenly_uses_integer_division() {
        let catalog = catalog();
        let trees = catalog.trees();
        let pool = expand_evenly(&trees, 31);
        assert_eq!(pool.len(), 30);
        assert_eq!(pool.iter().filter(|s| s.name == "Oak").count(), 15);
        assert!(expand_evenly(&[], 10).is_empty());
    }

    #[test]
    fn expand_by_percentage_uses_each_species_share() {
        let catalog = catalog();
        let trees = catalog.trees();
        let pool = expand_by_percentage(&trees, 50);
        assert_eq!(pool.iter().filter(|s| s.name == "Oak").count(), 10);
        assert_eq!(pool.iter().filter(|s| s.name == "Lime").count(), 5);
    }

    #[test]
    fn cycling_pool_wraps_and_falls_back() {
        let catalog = catalog();
        let trees = catalog.trees();
        let mut rng = StdRng::seed_from_u64(1);

        let mut pool = CyclingPool::shuffled(expand_evenly(&trees, 2), &trees, &mut rng);
        let drawn: Vec<_> = (0..4).map(|_| pool.next().unwrap().name.clone()).collect();
        assert_eq!(drawn[0], drawn[2]);
        assert_eq!(drawn[1], drawn[3]);

        let mut fallback = CyclingPool::shuffled(Vec::new(), &trees, &mut rng);
        assert_eq!(fallback.next().unwrap().name, "Oak");
        assert_eq!(fallback.next().unwrap().name, "Lime");

        let mut empty = CyclingPool::shuffled(Vec::new(), &[], &mut rng);
        assert!(empty.next().is_none());
    }

    #[test]
    fn edges_receive_only_shrubs() {
        let catalog = catalog();
        let mut ps = positions(4, 10);
        let trees = catalog.trees();
        let shrubs = catalog.shrubs();
        let mut rng = StdRng::seed_from_u64(5);
        assign_edges_then_inner(
            &mut ps,
            expand_evenly(&trees, 12),
            expand_evenly(&shrubs, 28),
            &mut rng,
        );

        assert!(ps.iter().all(PlantingPosition::is_assigned));
        assert!(ps
            .iter()
            .filter(|p| p.is_edge())
            .all(|p| p.plant_type == PlantType::Shrub));
        assert_eq!(
            ps.iter().filter(|p| p.plant_type == PlantType::Tree).count(),
            12
        );
    }

    #[test]
    fn short_pools_leave_positions_unassigned_until_repaired() {
        let catalog = catalog();
        let mut ps = positions(3, 10);
        let trees = catalog.trees();
        let shrubs = catalog.shrubs();
        let mut rng = StdRng::seed_from_u64(11);
        assign_edges_then_inner(
            &mut ps,
            expand_evenly(&trees, 4),
            expand_evenly(&shrubs, 14),
            &mut rng,
        );
        assert_eq!(ps.iter().filter(|p| !p.is_assigned()).count(), 12);

        let repaired = repair_unassigned(&mut ps, &catalog, &mut rng);
        assert_eq!(repaired, 12);
        assert!(ps.iter().all(PlantingPosition::is_assigned));
        assert!(ps
            .iter()
            .filter(|p| p.is_edge())
            .all(|p| p.plant_type == PlantType::Shrub));
    }
}
