//! Species catalog: named species tagged tree or shrub, each with a target percentage.
use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Growth form of a species, or of a planting position before allocation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PlantType {
    Tree,
    Shrub,
    #[default]
    Unassigned,
}

impl PlantType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlantType::Tree => "tree",
            PlantType::Shrub => "shrub",
            PlantType::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One catalog entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct SpeciesSpec {
    /// Species name, unique within a catalog.
    pub name: String,
    /// Either [`PlantType::Tree`] or [`PlantType::Shrub`].
    pub plant_type: PlantType,
    /// Share of all positions this species should receive, in percent.
    pub target_percentage: f64,
}

impl SpeciesSpec {
    pub fn new(name: impl Into<String>, plant_type: PlantType, target_percentage: f64) -> Self {
        Self {
            name: name.into(),
            plant_type,
            target_percentage,
        }
    }

    pub fn tree(name: impl Into<String>, target_percentage: f64) -> Self {
        Self::new(name, PlantType::Tree, target_percentage)
    }

    pub fn shrub(name: impl Into<String>, target_percentage: f64) -> Self {
        Self::new(name, PlantType::Shrub, target_percentage)
    }
}

/// Validated, ordered set of [`SpeciesSpec`]s.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCatalog {
    species: Vec<SpeciesSpec>,
}

impl SpeciesCatalog {
    /// Builds a catalog, rejecting unassigned types, duplicate names and
    /// percentages outside `[0, 100]`.
    pub fn try_new(species: Vec<SpeciesSpec>) -> Result<Self> {
        if species.is_empty() {
            return Err(Error::InvalidConfig("species catalog is empty".into()));
        }
        let mut seen = HashSet::with_capacity(species.len());
        for s in &species {
            if s.name.trim().is_empty() {
                return Err(Error::InvalidConfig("species name must not be blank".into()));
            }
            if s.plant_type == PlantType::Unassigned {
                return Err(Error::InvalidConfig(format!(
                    "species '{}' must be a tree or a shrub",
                    s.name
                )));
            }
            if !s.target_percentage.is_finite() || !(0.0..=100.0).contains(&s.target_percentage)
            {
                return Err(Error::InvalidConfig(format!(
                    "species '{}' target percentage must be within [0, 100]",
                    s.name
                )));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "species '{}' listed twice",
                    s.name
                )));
            }
        }
        Ok(Self { species })
    }

    /// Native hedgerow mix: 13 trees and 17 shrubs.
    pub fn native_hedgerow() -> Self {
        let trees = [
            ("Quercus petraea", 10.0),
            ("Quercus robur", 10.0),
            ("Acer campestre", 5.0),
            ("Tilia platyphyllos", 5.0),
            ("Acer pseudoplatanus", 5.0),
            ("Sorbus aucuparia", 5.0),
            ("Tilia cordata", 5.0),
            ("Carpinus betulus", 5.0),
            ("Salix alba", 5.0),
            ("Prunus avium", 5.0),
            ("Ulmus laevis", 5.0),
            ("Betula pendula", 5.0),
            ("Malus sylvestris", 5.0),
        ];
        let shrubs = [
            "Rosa canina",
            "Rosa rubiginosa",
            "Rosa corymbifera",
            "Crataegus monogyna",
            "Crataegus laevigata",
            "Viburnum opulus",
            "Prunus padus",
            "Sorbus torminalis",
            "Rhamnus cathartica",
            "Cornus sanguinea",
            "Corylus avellana",
            "Sambucus nigra",
            "Euonymus europaeus",
            "Pyrus pyraster",
            "Salix viminalis",
            "Salix purpurea",
            "Salix caprea",
        ];
        let species = trees
            .iter()
            .map(|&(name, pct)| SpeciesSpec::tree(name, pct))
            .chain(shrubs.iter().map(|&name| SpeciesSpec::shrub(name, 3.0)))
            .collect();
        Self { species }
    }

    pub fn species(&self) -> &[SpeciesSpec] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesSpec> {
        self.species.iter().find(|s| s.name == name)
    }

    /// All species of one type, in catalog order.
    pub fn of_type(&self, plant_type: PlantType) -> Vec<&SpeciesSpec> {
        self.species
            .iter()
            .filter(|s| s.plant_type == plant_type)
            .collect()
    }

    pub fn trees(&self) -> Vec<&SpeciesSpec> {
        self.of_type(PlantType::Tree)
    }

    pub fn shrubs(&self) -> Vec<&SpeciesSpec> {
        self.of_type(PlantType::Shrub)
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::native_hedgerow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_catalog_splits_into_trees_and_shrubs() {
        let catalog = SpeciesCatalog::native_hedgerow();
        assert_eq!(catalog.trees().len(), 13);
        assert_eq!(catalog.shrubs().len(), 17);
        let total: f64 = catalog.species().iter().map(|s| s.target_percentage).sum();
        assert!((total - 126.0).abs() < 1e-9);
        assert!(SpeciesCatalog::try_new(catalog.species().to_vec()).is_ok());
    }

    #[test]
    fn rejects_duplicates_and_bad_percentages() {
        let dup = SpeciesCatalog::try_new(vec![
            SpeciesSpec::tree("Oak", 10.0),
            SpeciesSpec::shrub("Oak", 10.0),
        ]);
        assert!(matches!(dup, Err(Error::InvalidConfig(_))));

        let pct = SpeciesCatalog::try_new(vec![SpeciesSpec::tree("Oak", 120.0)]);
        assert!(matches!(pct, Err(Error::InvalidConfig(_))));

        let nan = SpeciesCatalog::try_new(vec![SpeciesSpec::tree("Oak", f64::NAN)]);
        assert!(matches!(nan, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_unassigned_type_and_empty_catalog() {
        let unassigned = SpeciesCatalog::try_new(vec![SpeciesSpec::new(
            "Mystery",
            PlantType::Unassigned,
            5.0,
        )]);
        assert!(matches!(unassigned, Err(Error::InvalidConfig(_))));
        assert!(SpeciesCatalog::try_new(Vec::new()).is_err());
    }

    #[test]
    fn lookup_by_name() {
        let catalog = SpeciesCatalog::native_hedgerow();
        let hazel = catalog.get("Corylus avellana").expect("hazel present");
        assert_eq!(hazel.plant_type, PlantType::Shrub);
        assert!(catalog.get("Pinus sylvestris").is_none());
    }
}
