//! Lattice generation: multi-row planting positions along hedgerow centerlines.
//!
//! Each line part is sampled every `plant_spacing` units of arc length. Row `r`
//! sits `r * row_spacing` to the left of the centerline, measured along the local
//! direction rotated by +90°. The local direction at distance `d` is taken from the
//! centerline points at `d` and `d + plant_spacing`, or from the previous point for
//! the last position of a part.
use glam::DVec2;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lattice::polyline::{HedgerowLayer, Polyline};
use crate::lattice::row::{classify_row, RowClass};
use crate::species::PlantType;

pub mod polyline;
pub mod row;

/// Row layout parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    /// Number of parallel rows, including both edge rows.
    pub rows: usize,
    /// Lateral distance between neighbouring rows.
    pub row_spacing: f64,
    /// Arc-length distance between neighbouring positions within a row.
    pub plant_spacing: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            rows: 7,
            row_spacing: 1.25,
            plant_spacing: 1.0,
        }
    }
}

impl LatticeConfig {
    pub fn new(rows: usize, row_spacing: f64, plant_spacing: f64) -> Self {
        Self {
            rows,
            row_spacing,
            plant_spacing,
        }
    }

    /// Sets the number of rows.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the lateral row spacing.
    pub fn with_row_spacing(mut self, row_spacing: f64) -> Self {
        self.row_spacing = row_spacing;
        self
    }

    /// Sets the along-line plant spacing.
    pub fn with_plant_spacing(mut self, plant_spacing: f64) -> Self {
        self.plant_spacing = plant_spacing;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::InvalidConfig("rows must be > 0".into()));
        }
        if !self.row_spacing.is_finite() || self.row_spacing <= 0.0 {
            return Err(Error::InvalidConfig("row_spacing must be > 0".into()));
        }
        if !self.plant_spacing.is_finite() || self.plant_spacing <= 0.0 {
            return Err(Error::InvalidConfig("plant_spacing must be > 0".into()));
        }
        Ok(())
    }
}

/// A single planting position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlantingPosition {
    /// 1-based id in generation order.
    pub id: usize,
    /// Planting coordinate in the layer's CRS.
    pub position: DVec2,
    /// 0-based row index.
    pub row: usize,
    /// Edge or inner, derived from `row` and the row count.
    pub row_class: RowClass,
    /// Index of the source feature.
    pub group_id: usize,
    /// Assigned species, `None` until allocation.
    pub species: Option<String>,
    /// Type of the assigned species.
    pub plant_type: PlantType,
    /// Shrub cluster id; 0 for trees and unclustered positions.
    pub cluster_id: u32,
}

impl PlantingPosition {
    #[inline]
    pub fn is_edge(&self) -> bool {
        self.row_class.is_edge()
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.species.is_some()
    }

    pub(crate) fn assign(&mut self, species: &str, plant_type: PlantType, cluster_id: u32) {
        self.species = Some(species.to_owned());
        self.plant_type = plant_type;
        self.cluster_id = cluster_id;
    }
}

/// Generated positions plus the layout they came from.
///
/// Positions are stored in generation order (feature, part, row, distance), so a
/// position's index is `id - 1`.
#[derive(Debug, Clone, Default)]
pub struct Lattice {
    pub positions: Vec<PlantingPosition>,
    /// Row count used to classify positions.
    pub rows: usize,
    /// Number of source features; group ids are `0..group_count`.
    pub group_count: usize,
    /// CRS passed through from the layer.
    pub crs: Option<String>,
}

impl Lattice {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Indices of all positions belonging to `group_id`, in generation order.
    pub fn group_indices(&self, group_id: usize) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.group_id == group_id)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_edge()).count()
    }

    pub fn unassigned_count(&self) -> usize {
        self.positions.iter().filter(|p| !p.is_assigned()).count()
    }
}

/// Lays out planting positions for every feature of `layer`.
///
/// Fails without producing positions if the configuration is invalid or any
/// feature is not a line.
pub fn generate_lattice(layer: &HedgerowLayer, config: &LatticeConfig) -> Result<Lattice> {
    config.validate()?;
    let features = layer.line_parts()?;

    let mut counts = Vec::with_capacity(features.len());
    let mut total = 0usize;
    for parts in &features {
        let per_part = parts
            .iter()
            .map(|part| positions_per_row(part.length(), config.plant_spacing))
            .collect::<Result<Vec<_>>>()?;
        for &count in &per_part {
            total = total.saturating_add(count.saturating_mul(config.rows));
        }
        counts.push(per_part);
    }
    if total > MAX_POSITIONS {
        return Err(Error::InvalidConfig(format!(
            "layer needs {total} positions, more than the limit of {MAX_POSITIONS}"
        )));
    }

    let mut positions = Vec::with_capacity(total);
    for (group_id, (parts, per_part)) in features.iter().zip(&counts).enumerate() {
        let before = positions.len();
        for (part, &count) in parts.iter().zip(per_part) {
            lay_out_part(part, count, group_id, config, &mut positions);
        }
        debug!(
            "Feature {}: {} part(s), {} positions.",
            group_id,
            parts.len(),
            positions.len() - before
        );
    }

    info!(
        "Generated {} positions in {} rows across {} feature(s).",
        positions.len(),
        config.rows,
        features.len()
    );

    Ok(Lattice {
        positions,
        rows: config.rows,
        group_count: features.len(),
        crs: layer.crs.clone(),
    })
}

/// Upper bound on the positions one lattice may hold.
pub const MAX_POSITIONS: usize = 50_000_000;

/// Number of positions one row of a part of `length` receives.
///
/// Fails when `length / plant_spacing` is not finite or exceeds [`MAX_POSITIONS`].
pub fn positions_per_row(length: f64, plant_spacing: f64) -> Result<usize> {
    if !(length > 0.0 && plant_spacing > 0.0) {
        return Ok(0);
    }
    let ratio = length / plant_spacing;
    if !ratio.is_finite() || ratio > MAX_POSITIONS as f64 {
        return Err(Error::InvalidConfig(format!(
            "plant_spacing {plant_spacing} is too small for a part of length {length}"
        )));
    }
    let mut count = (length / plant_spacing).ceil() as usize;
    // Guard against rounding at the exact length boundary.
    while count > 0 && (count - 1) as f64 * plant_spacing >= length {
        count -= 1;
    }
    while (count as f64) * plant_spacing < length {
        count += 1;
    }
    Ok(count)
}

fn lay_out_part(
    part: &Polyline,
    count: usize,
    group_id: usize,
    config: &LatticeConfig,
    out: &mut Vec<PlantingPosition>,
) {

    let mut samples = Vec::with_capacity(count);
    for k in 0..count {
        let distance = k as f64 * config.plant_spacing;
        let Some(point) = part.point_at(distance) else {
            continue;
        };
        let normal = local_direction(part, distance, config.plant_spacing, point).perp();
        samples.push((point, normal));
    }

    for row in 0..config.rows {
        let offset = row as f64 * config.row_spacing;
        let row_class = classify_row(row, config.rows);
        for &(point, normal) in &samples {
            out.push(PlantingPosition {
                id: out.len() + 1,
                position: point + normal * offset,
                row,
                row_class,
                group_id,
                species: None,
                plant_type: PlantType::Unassigned,
                cluster_id: 0,
            });
        }
    }
}

fn local_direction(part: &Polyline, distance: f64, spacing: f64, point: DVec2) -> DVec2 {
    let length = part.length();
    let estimate = if distance + spacing <= length {
        part.point_at(distance + spacing).map(|next| next - point)
    } else if distance >= spacing {
        part.point_at(distance - spacing).map(|prev| point - prev)
    } else {
        part.chord_direction()
    };

    estimate
        .and_then(DVec2::try_normalize)
        .or_else(|| part.direction_at(distance))
        .unwrap_or(DVec2::X)
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point, MultiLineString};

    use super::*;

    fn straight_layer(length: f64) -> HedgerowLayer {
        HedgerowLayer::new(vec![line_string![(x: 0.0, y: 0.0), (x: length, y: 0.0)].into()])
    }

    #[test]
    fn straight_line_three_rows() {
        let lattice =
            generate_lattice(&straight_layer(10.0), &LatticeConfig::new(3, 1.25, 1.0)).unwrap();

        assert_eq!(lattice.len(), 30);
        assert_eq!(lattice.rows, 3);
        assert_eq!(lattice.group_count, 1);

        for row in 0..3 {
            let in_row: Vec<_> = lattice.positions.iter().filter(|p| p.row == row).collect();
            assert_eq!(in_row.len(), 10);
            for (k, p) in in_row.iter().enumerate() {
                assert!((p.position.x - k as f64).abs() < 1e-12);
                assert!((p.position.y - row as f64 * 1.25).abs() < 1e-12);
            }
        }

        assert_eq!(lattice.edge_count(), 20);
        assert!(lattice
            .positions
            .iter()
            .filter(|p| p.row == 1)
            .all(|p| p.row_class == RowClass::Inner));
    }

    #[test]
    fn ids_are_one_based_and_positions_start_unassigned() {
        let lattice =
            generate_lattice(&straight_layer(4.0), &LatticeConfig::new(2, 1.0, 1.0)).unwrap();
        for (i, p) in lattice.positions.iter().enumerate() {
            assert_eq!(p.id, i + 1);
            assert!(p.species.is_none());
            assert_eq!(p.plant_type, PlantType::Unassigned);
            assert_eq!(p.cluster_id, 0);
        }
        assert_eq!(lattice.unassigned_count(), lattice.len());
    }

    #[test]
    fn offsets_follow_local_direction_around_corners() {
        let layer = HedgerowLayer::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0)].into(),
        ]);
        let lattice = generate_lattice(&layer, &LatticeConfig::new(2, 1.0, 1.0)).unwrap();
        let row1: Vec<_> = lattice.positions.iter().filter(|p| p.row == 1).collect();
        assert_eq!(row1.len(), 8);

        // On the first leg the line heads +x, so row 1 sits at +y.
        assert!(row1[1].position.abs_diff_eq(DVec2::new(1.0, 1.0), 1e-12));
        // On the second leg the line heads +y, so row 1 sits at -x.
        assert!(row1[6].position.abs_diff_eq(DVec2::new(3.0, 2.0), 1e-12));
        // d + spacing lands exactly on the line's end, so the forward point is still used.
        assert!(row1[7].position.abs_diff_eq(DVec2::new(3.0, 3.0), 1e-12));
    }

    #[test]
    fn last_position_uses_previous_point() {
        // Length 2.5: positions at 0, 1, 2; the last has no forward neighbour.
        let layer = HedgerowLayer::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 2.5)].into(),
        ]);
        let lattice = generate_lattice(&layer, &LatticeConfig::new(2, 2.0, 1.0)).unwrap();
        let last = lattice.positions.last().unwrap();
        assert_eq!(last.row, 1);
        assert!(last.position.abs_diff_eq(DVec2::new(-2.0, 2.0), 1e-12));
    }

    #[test]
    fn short_part_uses_chord_direction() {
        let layer = HedgerowLayer::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: -0.5)].into(),
        ]);
        let lattice = generate_lattice(&layer, &LatticeConfig::new(2, 1.0, 1.0)).unwrap();
        assert_eq!(lattice.len(), 2);
        assert!(lattice.positions[1]
            .position
            .abs_diff_eq(DVec2::new(1.0, 0.0), 1e-12));
    }

    #[test]
    fn parts_of_a_feature_share_a_group() {
        let multi = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 12.0, y: 0.0)],
        ]);
        let layer = HedgerowLayer::new(vec![multi.into()])
            .with_feature(line_string![(x: 0.0, y: 20.0), (x: 5.0, y: 20.0)])
            .with_crs("EPSG:25833");
        let lattice = generate_lattice(&layer, &LatticeConfig::new(3, 1.0, 1.0)).unwrap();

        assert_eq!(lattice.group_count, 2);
        assert_eq!(lattice.group_indices(0).len(), (3 + 2) * 3);
        assert_eq!(lattice.group_indices(1).len(), 5 * 3);
        assert_eq!(lattice.crs.as_deref(), Some("EPSG:25833"));
    }

    #[test]
    fn count_matches_floor_formula() {
        let config = LatticeConfig::new(4, 0.8, 0.5);
        for &len in &[0.3, 1.0, 2.1, 7.0, 13.37, 40.0] {
            let steps: f64 = len / 0.5;
            let per_row = if steps.fract() == 0.0 {
                // At an exact multiple the endpoint itself is excluded.
                steps as usize
            } else {
                steps.floor() as usize + 1
            };
            let lattice = generate_lattice(&straight_layer(len), &config).unwrap();
            assert_eq!(lattice.len(), per_row * 4, "length {len}");
        }
    }

    #[test]
    fn positions_per_row_excludes_the_end() {
        assert_eq!(positions_per_row(10.0, 1.0).unwrap(), 10);
        assert_eq!(positions_per_row(10.5, 1.0).unwrap(), 11);
        assert_eq!(positions_per_row(0.2, 1.0).unwrap(), 1);
        assert_eq!(positions_per_row(0.0, 1.0).unwrap(), 0);
        assert_eq!(positions_per_row(0.3, 0.1).unwrap(), 3);
    }

    #[test]
    fn oversized_lattices_are_rejected_before_layout() {
        assert!(matches!(
            positions_per_row(1e300, 1e-300),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            positions_per_row(f64::MAX, 0.5),
            Err(Error::InvalidConfig(_))
        ));

        let tiny = LatticeConfig::new(1, 1.0, 1e-300);
        assert!(tiny.validate().is_ok());
        assert!(matches!(
            generate_lattice(&straight_layer(1.0), &tiny),
            Err(Error::InvalidConfig(_))
        ));

        // Each part is fine on its own, but the rows multiply past the limit.
        let many_rows = LatticeConfig::new(usize::MAX, 1.0, 1.0);
        assert!(matches!(
            generate_lattice(&straight_layer(10.0), &many_rows),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_non_line_input_and_bad_config() {
        let layer = HedgerowLayer::new(vec![point!(x: 0.0, y: 0.0).into()]);
        assert!(matches!(
            generate_lattice(&layer, &LatticeConfig::default()),
            Err(Error::NotLineGeometry { .. })
        ));

        for bad in [
            LatticeConfig::default().with_rows(0),
            LatticeConfig::default().with_row_spacing(0.0),
            LatticeConfig::default().with_plant_spacing(-1.0),
            LatticeConfig::default().with_plant_spacing(f64::NAN),
        ] {
            assert!(matches!(
                generate_lattice(&straight_layer(5.0), &bad),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn empty_layer_yields_empty_lattice() {
        let lattice = generate_lattice(&HedgerowLayer::default(), &LatticeConfig::default())
            .expect("empty layer is valid");
        assert!(lattice.is_empty());
        assert_eq!(lattice.group_count, 0);
    }
}
