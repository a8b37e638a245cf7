//! Event types and sinks for observing planner runs.
//!
//! This module defines [`PlannerEvent`] and a set of sinks that emit, collect, or
//! forward events while [`crate::planner::run_pipeline`] or
//! [`crate::planner::HedgerowPlanner`] executes.
use crate::allocation::AllocationReport;
use crate::planner::PlannerConfig;
use crate::summary::SummaryReport;

/// Describes events emitted by a planner run.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlannerEvent {
    /// Emitted before the lattice is generated.
    RunStarted {
        /// The configuration used.
        config: PlannerConfig,
        /// Number of features in the input layer.
        feature_count: usize,
        /// Number of species in the catalog.
        species_count: usize,
    },

    /// Emitted once all planting positions exist.
    LatticeGenerated {
        /// Total positions generated.
        positions: usize,
        /// Number of input features; each feature is one group.
        groups: usize,
        /// Positions on edge rows.
        edge_positions: usize,
    },

    /// Emitted after species allocation.
    AllocationFinished {
        /// Counts and diagnostics of the allocation.
        report: AllocationReport,
    },

    /// Emitted for each group polygon.
    GroupAggregated {
        group_id: usize,
        position_count: usize,
        area: f64,
        perimeter: f64,
        degenerate: bool,
    },

    /// Emitted when the run completes.
    RunFinished {
        /// Global species summary.
        summary: SummaryReport,
    },

    /// Non-fatal warning generated during the run.
    Warning {
        /// Context string (e.g. `group:3`, `allocation`).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

impl PlannerEvent {
    pub fn kind(&self) -> PlannerEventKind {
        match self {
            PlannerEvent::RunStarted { .. } => PlannerEventKind::RunStarted,
            PlannerEvent::LatticeGenerated { .. } => PlannerEventKind::LatticeGenerated,
            PlannerEvent::AllocationFinished { .. } => PlannerEventKind::AllocationFinished,
            PlannerEvent::GroupAggregated { .. } => PlannerEventKind::GroupAggregated,
            PlannerEvent::RunFinished { .. } => PlannerEventKind::RunFinished,
            PlannerEvent::Warning { .. } => PlannerEventKind::Warning,
        }
    }
}

/// Discriminant of [`PlannerEvent`], used by sinks to skip building unwanted events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlannerEventKind {
    RunStarted,
    LatticeGenerated,
    AllocationFinished,
    GroupAggregated,
    RunFinished,
    Warning,
}

/// A generic event sink that accepts [`PlannerEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlannerEvent);

    /// Whether the sink wants events of `kind`. The runner checks this before
    /// building an event.
    #[inline]
    fn wants(&self, _kind: PlannerEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PlannerEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlannerEvent) {}

    #[inline]
    fn wants(&self, _kind: PlannerEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlannerEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlannerEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlannerEvent),
{
    #[inline]
    fn send(&mut self, event: PlannerEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlannerEvent>,
    only: Option<Vec<PlannerEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events whose kind is in `kinds`.
    pub fn filtered(kinds: impl IntoIterator<Item = PlannerEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PlannerEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlannerEvent] {
        &self.events
    }

    /// Warning messages collected so far, with their context.
    pub fn warnings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.events.iter().filter_map(|e| match e {
            PlannerEvent::Warning { context, message } => {
                Some((context.as_str(), message.as_str()))
            }
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlannerEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PlannerEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[S] {
        &self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PlannerEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: PlannerEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
