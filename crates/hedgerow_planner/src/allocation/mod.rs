//! Species allocation: give every planting position a species and a type.
//!
//! One entry point, [`allocate`], dispatches on an [`AllocationPolicy`]:
//! - [`AllocationPolicy::FlatPercentage`]: per-species quotas, no reconciliation.
//! - [`AllocationPolicy::TypeSplit`]: tree/shrub quotas split evenly per species, then a repair pass.
//! - [`AllocationPolicy::SequentialClusters`]: shrub clusters in generation order, trees after.
//! - [`AllocationPolicy::BalancedClusters`]: per-group tree shares, shrub-only edges, clusters elsewhere.
//!
//! Edge rows never receive trees, except under `SequentialClusters`, which ignores row
//! eligibility and reports any edge trees it places. All randomness comes from the
//! caller's RNG.
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::RngCore;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lattice::Lattice;
use crate::species::{PlantType, SpeciesCatalog, SpeciesSpec};

mod balanced;
pub(crate) mod cluster;
mod flat;
pub(crate) mod pool;
mod sequential;
mod split;

/// Inclusive bounds for shrub cluster sizes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRange {
    pub min: usize,
    pub max: usize,
}

impl ClusterRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min == 0 {
            return Err(Error::InvalidConfig("cluster size minimum must be > 0".into()));
        }
        if self.min > self.max {
            return Err(Error::InvalidConfig(format!(
                "cluster size minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl From<RangeInclusive<usize>> for ClusterRange {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

/// What [`AllocationPolicy::FlatPercentage`] does with positions its quotas do not cover.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapHandling {
    /// Leave them unassigned and report the count.
    #[default]
    Report,
    /// Fill them with the shared repair pass.
    Repair,
}

/// How species are distributed over positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AllocationPolicy {
    /// Each species gets `floor(total * pct / 100)` positions. Edges take shrubs
    /// first; remaining shrubs and all trees are shuffled over the inner rows.
    FlatPercentage { gap: GapHandling },
    /// One tree and one shrub quota, each divided evenly among its species, followed
    /// by a repair pass. Without `shrub_percentage` the shrub quota is whatever the
    /// tree quota leaves.
    TypeSplit {
        tree_percentage: f64,
        shrub_percentage: Option<f64>,
    },
    /// Shrub clusters in generation order until the shrub budget is used, trees after.
    /// Ignores edge/inner eligibility.
    SequentialClusters {
        tree_percentage: f64,
        clusters: ClusterRange,
    },
    /// Tree quota shared evenly across groups; within a group each row is shuffled,
    /// inner positions take trees while the group's share lasts, everything else is
    /// clustered.
    BalancedClusters {
        tree_percentage: f64,
        clusters: ClusterRange,
    },
}

impl AllocationPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            AllocationPolicy::FlatPercentage { .. } => "flat-percentage",
            AllocationPolicy::TypeSplit { .. } => "type-split",
            AllocationPolicy::SequentialClusters { .. } => "sequential-clusters",
            AllocationPolicy::BalancedClusters { .. } => "balanced-clusters",
        }
    }

    /// Tree percentage for quota-split policies.
    pub fn tree_percentage(&self) -> Option<f64> {
        match *self {
            AllocationPolicy::FlatPercentage { .. } => None,
            AllocationPolicy::TypeSplit {
                tree_percentage, ..
            }
            | AllocationPolicy::SequentialClusters {
                tree_percentage, ..
            }
            | AllocationPolicy::BalancedClusters {
                tree_percentage, ..
            } => Some(tree_percentage),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(pct) = self.tree_percentage() {
            validate_percentage("tree_percentage", pct)?;
        }
        match self {
            AllocationPolicy::TypeSplit {
                shrub_percentage: Some(pct),
                ..
            } => validate_percentage("shrub_percentage", *pct),
            AllocationPolicy::SequentialClusters { clusters, .. }
            | AllocationPolicy::BalancedClusters { clusters, .. } => clusters.validate(),
            _ => Ok(()),
        }
    }
}

fn validate_percentage(field: &str, pct: f64) -> Result<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(Error::InvalidConfig(format!(
            "{field} must be within [0, 100], got {pct}"
        )));
    }
    Ok(())
}

/// Allocation settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    pub policy: AllocationPolicy,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::BalancedClusters {
                tree_percentage: 30.0,
                clusters: ClusterRange::new(3, 5),
            },
        }
    }
}

impl AllocationConfig {
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    /// Sets the allocation policy.
    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()
    }
}

/// Outcome counters of one allocation run.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationReport {
    /// Name of the policy that ran.
    pub policy: &'static str,
    /// Number of positions considered.
    pub total: usize,
    pub trees: usize,
    pub shrubs: usize,
    /// Positions still without a species. Non-zero only for `FlatPercentage` with
    /// [`GapHandling::Report`].
    pub unassigned: usize,
    /// Positions filled by the repair pass.
    pub repaired: usize,
    /// Nominal tree quota (`None` for per-species quotas).
    pub tree_quota: Option<usize>,
    /// Tree share per group id. Groups without positions have no entry.
    pub trees_per_group: BTreeMap<usize, usize>,
    /// Trees that could not be placed because a group ran out of inner positions.
    pub tree_shortfall: usize,
    /// Shrub clusters created.
    pub clusters: u32,
    /// Trees placed on edge rows (only `SequentialClusters` can do this).
    pub edge_trees: usize,
}

impl AllocationReport {
    /// True when every position received a species.
    pub fn is_complete(&self) -> bool {
        self.unassigned == 0
    }
}

/// Policy-specific counters merged into the [`AllocationReport`].
#[derive(Debug, Default)]
pub(crate) struct PolicyOutcome {
    pub(crate) repaired: usize,
    pub(crate) tree_quota: Option<usize>,
    pub(crate) trees_per_group: BTreeMap<usize, usize>,
    pub(crate) tree_shortfall: usize,
    pub(crate) clusters: u32,
}

/// Species split by type, in catalog order.
pub(crate) struct TypedSpecies<'a> {
    pub(crate) trees: Vec<&'a SpeciesSpec>,
    pub(crate) shrubs: Vec<&'a SpeciesSpec>,
}

/// Assigns a species to every position of `lattice` according to `config`.
///
/// Fails before touching any position if the policy is invalid or a required
/// species type has no entries in `catalog`.
pub fn allocate<R: RngCore + ?Sized>(
    lattice: &mut Lattice,
    catalog: &SpeciesCatalog,
    config: &AllocationConfig,
    rng: &mut R,
) -> Result<AllocationReport> {
    config.validate()?;
    let policy = &config.policy;
    let total = lattice.len();

    let species = TypedSpecies {
        trees: catalog.trees(),
        shrubs: catalog.shrubs(),
    };
    check_required_species(policy, &species, total)?;

    let outcome = match policy {
        AllocationPolicy::FlatPercentage { gap } => {
            flat::allocate(&mut lattice.positions, &species, catalog, *gap, rng)
        }
        AllocationPolicy::TypeSplit {
            tree_percentage,
            shrub_percentage,
        } => split::allocate(
            &mut lattice.positions,
            &species,
            catalog,
            *tree_percentage,
            *shrub_percentage,
            rng,
        ),
        AllocationPolicy::SequentialClusters {
            tree_percentage,
            clusters,
        } => sequential::allocate(
            &mut lattice.positions,
            &species,
            *tree_percentage,
            *clusters,
            rng,
        ),
        AllocationPolicy::BalancedClusters {
            tree_percentage,
            clusters,
        } => balanced::allocate(
            &mut lattice.positions,
            &species,
            *tree_percentage,
            *clusters,
            rng,
        ),
    };

    let report = build_report(lattice, policy.name(), outcome);

    if report.unassigned > 0 {
        warn!(
            "Policy '{}' left {} of {} positions without a species.",
            report.policy, report.unassigned, report.total
        );
    }
    if report.edge_trees > 0 {
        warn!(
            "Policy '{}' placed {} trees on edge rows.",
            report.policy, report.edge_trees
        );
    }
    if report.tree_shortfall > 0 {
        warn!(
            "Policy '{}' could not place {} trees: not enough inner positions.",
            report.policy, report.tree_shortfall
        );
    }
    debug!(
        "Allocation '{}': {} repaired, {} clusters.",
        report.policy, report.repaired, report.clusters
    );
    info!(
        "Allocated {} trees and {} shrubs over {} positions.",
        report.trees, report.shrubs, report.total
    );

    Ok(report)
}

fn check_required_species(
    policy: &AllocationPolicy,
    species: &TypedSpecies<'_>,
    total: usize,
) -> Result<()> {
    if total == 0 {
        return Ok(());
    }
    if species.shrubs.is_empty() {
        return Err(Error::EmptySpeciesList {
            plant_type: PlantType::Shrub,
        });
    }
    let tree_quota = policy
        .tree_percentage()
        .map(|pct| pool::quota(total, pct))
        .unwrap_or(0);
    if tree_quota > 0 && species.trees.is_empty() {
        return Err(Error::EmptySpeciesList {
            plant_type: PlantType::Tree,
        });
    }
    Ok(())
}

fn build_report(lattice: &Lattice, policy: &'static str, outcome: PolicyOutcome) -> AllocationReport {
    let mut report = AllocationReport {
        policy,
        total: lattice.len(),
        repaired: outcome.repaired,
        tree_quota: outcome.tree_quota,
        trees_per_group: outcome.trees_per_group,
        tree_shortfall: outcome.tree_shortfall,
        clusters: outcome.clusters,
        ..Default::default()
    };
    for p in &lattice.positions {
        match p.plant_type {
            PlantType::Tree => {
                report.trees += 1;
                if p.is_edge() {
                    report.edge_trees += 1;
                }
            }
            PlantType::Shrub => report.shrubs += 1,
            PlantType::Unassigned => report.unassigned += 1,
        }
    }
    report
}
