//! Shrub clustering: contiguous runs sharing one species and one cluster id.
use rand::RngCore;

use crate::allocation::pool::CyclingPool;
use crate::allocation::ClusterRange;
use crate::lattice::PlantingPosition;
use crate::random::rand_inclusive;

/// Deals positions out as clusters, numbering clusters from 1 across all calls.
pub(crate) struct Clusterer<'a> {
    range: ClusterRange,
    shrubs: CyclingPool<'a>,
    next_id: u32,
}

impl<'a> Clusterer<'a> {
    pub(crate) fn new(range: ClusterRange, shrubs: CyclingPool<'a>) -> Self {
        Self {
            range,
            shrubs,
            next_id: 1,
        }
    }

    /// Number of clusters created so far.
    pub(crate) fn clusters_created(&self) -> u32 {
        self.next_id - 1
    }

    /// Assigns `indices` in the given order as consecutive clusters.
    ///
    /// Each cluster size is drawn from the configured range; the final cluster is
    /// cut short when `indices` runs out.
    pub(crate) fn assign_runs<R: RngCore + ?Sized>(
        &mut self,
        positions: &mut [PlantingPosition],
        indices: &[usize],
        rng: &mut R,
    ) {
        let mut rest = indices;
        while !rest.is_empty() {
            let size = rand_inclusive(rng, self.range.min, self.range.max).min(rest.len());
            let Some(spec) = self.shrubs.next() else {
                return;
            };
            let (run, tail) = rest.split_at(size);
            for &i in run {
                positions[i].assign(&spec.name, spec.plant_type, self.next_id);
            }
            self.next_id += 1;
            rest = tail;
        }
    }
}
