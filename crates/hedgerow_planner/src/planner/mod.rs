//! High-level runner: lattice, allocation, aggregation and summary in one pass.
use rand::RngCore;
use tracing::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_groups, AggregationConfig, AggregationPolygon};
use crate::allocation::{allocate, AllocationConfig, AllocationReport};
use crate::error::Result;
use crate::lattice::polyline::HedgerowLayer;
use crate::lattice::{generate_lattice, Lattice, LatticeConfig, PlantingPosition};
use crate::planner::events::{EventSink, PlannerEvent, PlannerEventKind};
use crate::species::SpeciesCatalog;
use crate::summary::{summarize, SummaryReport};

pub mod events;

/// Configuration for a full planner run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerConfig {
    pub lattice: LatticeConfig,
    pub allocation: AllocationConfig,
    pub aggregation: AggregationConfig,
}

impl PlannerConfig {
    pub fn new(lattice: LatticeConfig, allocation: AllocationConfig) -> Self {
        Self {
            lattice,
            allocation,
            aggregation: AggregationConfig::default(),
        }
    }

    /// Sets the lattice configuration.
    pub fn with_lattice(mut self, lattice: LatticeConfig) -> Self {
        self.lattice = lattice;
        self
    }

    /// Sets the allocation configuration.
    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = allocation;
        self
    }

    /// Sets the aggregation configuration.
    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Validates all three stages, returning the first error.
    pub fn validate(&self) -> Result<()> {
        self.lattice.validate()?;
        self.allocation.validate()?;
        self.aggregation.validate()
    }
}

/// Everything a run produces.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// Planting positions with their assigned species. Carries the input CRS.
    pub lattice: Lattice,
    pub allocation: AllocationReport,
    /// One polygon per group, in group id order.
    pub polygons: Vec<AggregationPolygon>,
    pub summary: SummaryReport,
}

impl PlanResult {
    pub fn positions(&self) -> &[PlantingPosition] {
        &self.lattice.positions
    }

    /// Coordinate reference system of the input layer, passed through unchanged.
    pub fn crs(&self) -> Option<&str> {
        self.lattice.crs.as_deref()
    }
}

/// Runs the pipeline with a fixed configuration and species catalog.
pub struct HedgerowPlanner {
    /// Run configuration applied to this planner.
    pub config: PlannerConfig,
    /// Species to allocate from.
    pub catalog: SpeciesCatalog,
}

impl HedgerowPlanner {
    pub fn try_new(config: PlannerConfig, catalog: SpeciesCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, catalog })
    }

    pub fn new(config: PlannerConfig, catalog: SpeciesCatalog) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid planner config");
        Self { config, catalog }
    }

    /// Runs the pipeline on `layer`.
    pub fn run(&self, layer: &HedgerowLayer, rng: &mut impl RngCore) -> Result<PlanResult> {
        run_pipeline(layer, &self.config, &self.catalog, rng, None)
    }

    pub fn run_with_events(
        &self,
        layer: &HedgerowLayer,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<PlanResult> {
        run_pipeline(layer, &self.config, &self.catalog, rng, Some(sink))
    }
}

/// Generates the lattice, allocates species, aggregates groups and summarizes.
///
/// Configuration and input errors surface before any position is produced. The
/// same seed, input and configuration always give the same result.
pub fn run_pipeline<R: RngCore + ?Sized>(
    layer: &HedgerowLayer,
    config: &PlannerConfig,
    catalog: &SpeciesCatalog,
    rng: &mut R,
    sink: Option<&mut dyn EventSink>,
) -> Result<PlanResult> {
    if let Some(s) = sink {
        run_pipeline_internal(layer, config, catalog, rng, s)
    } else {
        run_pipeline_internal(layer, config, catalog, rng, &mut ())
    }
}

fn run_pipeline_internal<R: RngCore + ?Sized>(
    layer: &HedgerowLayer,
    config: &PlannerConfig,
    catalog: &SpeciesCatalog,
    rng: &mut R,
    sink: &mut dyn EventSink,
) -> Result<PlanResult> {
    config.validate()?;

    if sink.wants(PlannerEventKind::RunStarted) {
        sink.send(PlannerEvent::RunStarted {
            config: config.clone(),
            feature_count: layer.features.len(),
            species_count: catalog.len(),
        });
    }

    let mut lattice = generate_lattice(layer, &config.lattice)?;
    if lattice.is_empty() {
        warn!("Input layer produced no planting positions.");
        emit_warning(sink, "lattice", "no planting positions generated".into());
    }
    if sink.wants(PlannerEventKind::LatticeGenerated) {
        sink.send(PlannerEvent::LatticeGenerated {
            positions: lattice.len(),
            groups: lattice.group_count,
            edge_positions: lattice.edge_count(),
        });
    }

    let report = allocate(&mut lattice, catalog, &config.allocation, rng)?;
    if report.unassigned > 0 {
        emit_warning(
            sink,
            "allocation",
            format!(
                "{} of {} positions left without a species",
                report.unassigned, report.total
            ),
        );
    }
    if report.tree_shortfall > 0 {
        emit_warning(
            sink,
            "allocation",
            format!(
                "{} trees could not be placed on inner rows",
                report.tree_shortfall
            ),
        );
    }
    if report.edge_trees > 0 {
        emit_warning(
            sink,
            "allocation",
            format!("{} trees placed on edge rows", report.edge_trees),
        );
    }
    if sink.wants(PlannerEventKind::AllocationFinished) {
        sink.send(PlannerEvent::AllocationFinished {
            report: report.clone(),
        });
    }

    let polygons = aggregate_groups(&lattice, &config.aggregation)?;
    for poly in &polygons {
        if poly.degenerate {
            emit_warning(
                sink,
                &format!("group:{}", poly.group_id),
                "degenerate hull; polygon is a buffered point or line".into(),
            );
        }
        if sink.wants(PlannerEventKind::GroupAggregated) {
            sink.send(PlannerEvent::GroupAggregated {
                group_id: poly.group_id,
                position_count: poly.position_count,
                area: poly.area,
                perimeter: poly.perimeter,
                degenerate: poly.degenerate,
            });
        }
    }

    let summary = summarize(&lattice.positions);
    info!(
        "Planned {} positions: {} species, {} groups.",
        summary.total_positions,
        summary.records.len(),
        polygons.len()
    );
    if sink.wants(PlannerEventKind::RunFinished) {
        sink.send(PlannerEvent::RunFinished {
            summary: summary.clone(),
        });
    }

    Ok(PlanResult {
        lattice,
        allocation: report,
        polygons,
        summary,
    })
}

fn emit_warning(sink: &mut dyn EventSink, context: &str, message: String) {
    if sink.wants(PlannerEventKind::Warning) {
        sink.send(PlannerEvent::Warning {
            context: context.to_owned(),
            message,
        });
    }
}
