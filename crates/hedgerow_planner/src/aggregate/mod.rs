//! Spatial aggregation: one buffered hull polygon per group, with species counts.
use std::collections::{BTreeMap, BTreeSet};

use geo::{Area, EuclideanLength, Polygon};
use glam::DVec2;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lattice::Lattice;

pub(crate) mod buffer;

/// Buffer settings for group polygons.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationConfig {
    /// Distance the convex hull is grown by.
    pub buffer_distance: f64,
    /// Circle segments per quarter turn used to round the buffer.
    pub quadrant_segments: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            buffer_distance: 1.0,
            quadrant_segments: 8,
        }
    }
}

impl AggregationConfig {
    pub fn new(buffer_distance: f64) -> Self {
        Self {
            buffer_distance,
            ..Default::default()
        }
    }

    /// Sets the buffer distance.
    pub fn with_buffer_distance(mut self, buffer_distance: f64) -> Self {
        self.buffer_distance = buffer_distance;
        self
    }

    /// Sets the number of segments per quarter circle.
    pub fn with_quadrant_segments(mut self, quadrant_segments: usize) -> Self {
        self.quadrant_segments = quadrant_segments;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.buffer_distance.is_finite() || self.buffer_distance <= 0.0 {
            return Err(Error::InvalidConfig("buffer_distance must be > 0".into()));
        }
        if self.quadrant_segments == 0 {
            return Err(Error::InvalidConfig("quadrant_segments must be > 0".into()));
        }
        Ok(())
    }
}

/// Summary polygon for one group.
#[derive(Debug, Clone)]
pub struct AggregationPolygon {
    pub group_id: usize,
    /// Buffered convex hull of the group's positions.
    pub boundary: Polygon<f64>,
    pub area: f64,
    pub perimeter: f64,
    /// Count per species, with an entry for every species present anywhere in the
    /// lattice so all polygons share one schema.
    pub species_counts: BTreeMap<String, usize>,
    /// Positions in the group.
    pub position_count: usize,
    /// The group had fewer than three distinct points, or only collinear ones.
    pub degenerate: bool,
}

impl AggregationPolygon {
    pub fn count(&self, species: &str) -> usize {
        self.species_counts.get(species).copied().unwrap_or(0)
    }
}

/// Builds one [`AggregationPolygon`] per group that has positions, in group id order.
///
/// Unassigned positions shape the hull but are not counted under any species.
pub fn aggregate_groups(lattice: &Lattice, config: &AggregationConfig) -> Result<Vec<AggregationPolygon>> {
    config.validate()?;

    let all_species: BTreeSet<&str> = lattice
        .positions
        .iter()
        .filter_map(|p| p.species.as_deref())
        .collect();

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, p) in lattice.positions.iter().enumerate() {
        groups.entry(p.group_id).or_default().push(i);
    }

    let mut polygons = Vec::with_capacity(groups.len());
    for (group_id, indices) in groups {
        let points: Vec<DVec2> = indices
            .iter()
            .map(|&i| lattice.positions[i].position)
            .collect();

        let degenerate = buffer::is_degenerate(&points);
        if degenerate {
            warn!(
                "Group {} has a degenerate hull ({} positions); buffering anyway.",
                group_id,
                points.len()
            );
        }

        let boundary =
            buffer::buffered_hull(&points, config.buffer_distance, config.quadrant_segments);
        let area = boundary.unsigned_area();
        let perimeter = boundary.exterior().euclidean_length();

        let mut species_counts: BTreeMap<String, usize> =
            all_species.iter().map(|s| (s.to_string(), 0)).collect();
        for &i in &indices {
            if let Some(name) = lattice.positions[i].species.as_deref() {
                if let Some(count) = species_counts.get_mut(name) {
                    *count += 1;
                }
            }
        }

        debug!(
            "Group {}: {} positions, area {:.2}, perimeter {:.2}.",
            group_id,
            indices.len(),
            area,
            perimeter
        );

        polygons.push(AggregationPolygon {
            group_id,
            boundary,
            area,
            perimeter,
            species_counts,
            position_count: indices.len(),
            degenerate,
        });
    }

    Ok(polygons)
}
