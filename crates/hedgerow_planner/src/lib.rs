#![forbid(unsafe_code)]
//! hedgerow_planner: planting layouts for multi-row hedgerows.
//!
//! Modules:
//! - lattice: lay out planting positions along polylines (rows, spacing, perpendicular offsets)
//! - allocation: assign species under quotas, edge-row rules and shrub clustering
//! - aggregate: per-group buffered hull polygons with area, perimeter and species counts
//! - summary: global per-(species, type) counts and percentages
//! - planner: pipeline runner, configuration and events
//!
//! For a walkthrough, see the `hedgerow_planner_examples` binaries.
pub mod aggregate;
pub mod allocation;
pub mod error;
pub mod lattice;
pub mod planner;
pub(crate) mod random;
pub mod species;
pub mod summary;
pub mod symbology;

/// Convenient re-exports for common types. Import with `use hedgerow_planner::prelude::*;`.
pub mod prelude {
    pub use crate::aggregate::{aggregate_groups, AggregationConfig, AggregationPolygon};
    pub use crate::allocation::{
        allocate, AllocationConfig, AllocationPolicy, AllocationReport, ClusterRange, GapHandling,
    };
    pub use crate::error::{Error, Result};
    pub use crate::lattice::polyline::{line_from_points, HedgerowLayer, Polyline};
    pub use crate::lattice::row::{classify_row, RowClass};
    pub use crate::lattice::{generate_lattice, Lattice, LatticeConfig, PlantingPosition};
    pub use crate::planner::events::{
        EventSink, FnSink, MultiSink, PlannerEvent, PlannerEventKind, VecSink,
    };
    pub use crate::planner::{run_pipeline, HedgerowPlanner, PlanResult, PlannerConfig};
    pub use crate::species::{PlantType, SpeciesCatalog, SpeciesSpec};
    pub use crate::summary::{summarize, SummaryRecord, SummaryReport};
    pub use crate::symbology::{species_color, type_color};
}
