//! Global species summary over all planting positions.
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::lattice::PlantingPosition;
use crate::species::PlantType;

/// Count and share of one `(species, plant type)` pair.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub species: String,
    pub plant_type: PlantType,
    pub count: usize,
    /// `100 * count / total positions`, unassigned positions included in the total.
    pub percentage: f64,
}

/// Per-species table, sorted by plant type and then species name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub records: Vec<SummaryRecord>,
    pub total_positions: usize,
    /// Positions without a species; never listed as a record.
    pub unassigned: usize,
}

impl SummaryReport {
    /// Total count of positions with a species.
    pub fn assigned(&self) -> usize {
        self.records.iter().map(|r| r.count).sum()
    }

    pub fn get(&self, species: &str) -> Option<&SummaryRecord> {
        self.records.iter().find(|r| r.species == species)
    }

    /// Summed count of all records of one plant type.
    pub fn count_of_type(&self, plant_type: PlantType) -> usize {
        self.records
            .iter()
            .filter(|r| r.plant_type == plant_type)
            .map(|r| r.count)
            .sum()
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .records
            .iter()
            .map(|r| r.species.len())
            .max()
            .unwrap_or(0)
            .max("species".len());
        writeln!(f, "{:<width$}  {:<6}  {:>6}  {:>7}", "species", "type", "count", "%")?;
        for r in &self.records {
            writeln!(
                f,
                "{:<width$}  {:<6}  {:>6}  {:>7.2}",
                r.species, r.plant_type, r.count, r.percentage
            )?;
        }
        write!(
            f,
            "{} positions, {} unassigned",
            self.total_positions, self.unassigned
        )
    }
}

/// Counts positions per `(species, plant type)`.
///
/// Positions with no species, or a blank one, count toward the total but produce
/// no record.
pub fn summarize(positions: &[PlantingPosition]) -> SummaryReport {
    let total = positions.len();
    let mut counts: BTreeMap<(PlantType, &str), usize> = BTreeMap::new();
    let mut unassigned = 0;

    for p in positions {
        match p.species.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                *counts.entry((p.plant_type, name)).or_insert(0) += 1;
            }
            _ => unassigned += 1,
        }
    }

    let records = counts
        .into_iter()
        .map(|((plant_type, species), count)| SummaryRecord {
            species: species.to_owned(),
            plant_type,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            },
        })
        .collect();

    SummaryReport {
        records,
        total_positions: total,
        unassigned,
    }
}
