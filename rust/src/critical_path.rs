//! Critical path extraction and the assembled schedule.

use std::collections::HashMap;

use crate::backward_pass::{compute_latest_dates, LatestDates};
use crate::config::PassConfig;
use crate::forward_pass::{compute_earliest_dates, EarliestDates};
use crate::graph::{GraphError, TaskGraph, TaskIdx};
use crate::log_summary;
use crate::models::{ScheduleResult, TaskSpec, TaskTiming};

/// Zero-slack tasks ordered by earliest start, ties broken by id.
///
/// Both passes must have run over `graph`. Empty only for an empty graph.
pub fn extract(
    graph: &TaskGraph,
    earliest: &EarliestDates,
    latest: &LatestDates,
) -> Vec<String> {
    let mut critical: Vec<TaskIdx> = graph
        .indices()
        .filter(|&idx| latest.latest_start(idx) == earliest.earliest_start(idx))
        .collect();

    // Indices follow id order, so the index is the id tie-breaker.
    critical.sort_by_key(|&idx| (earliest.earliest_start(idx), idx));

    critical
        .into_iter()
        .map(|idx| graph.id(idx).to_string())
        .collect()
}

/// A fully computed schedule. Immutable: recomputing means building a new one.
#[derive(Debug, Clone)]
pub struct Schedule {
    graph: TaskGraph,
    earliest: EarliestDates,
    latest: LatestDates,
    critical_path: Vec<String>,
}

impl Schedule {
    /// Run both passes over a validated graph and extract the critical path.
    pub fn compute(graph: TaskGraph, config: &PassConfig) -> Self {
        let earliest = compute_earliest_dates(&graph, config);
        let latest = compute_latest_dates(&graph, earliest.makespan(), config);
        let critical_path = extract(&graph, &earliest, &latest);

        log_summary!(
            config.verbosity,
            "critical path ({} of {} task(s)): {}",
            critical_path.len(),
            graph.len(),
            critical_path.join(" -> ")
        );

        Self {
            graph,
            earliest,
            latest,
            critical_path,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn makespan(&self) -> i64 {
        self.earliest.makespan()
    }

    pub fn critical_path(&self) -> &[String] {
        &self.critical_path
    }

    fn timing_at(&self, idx: TaskIdx) -> TaskTiming {
        let earliest_start = self.earliest.earliest_start(idx);
        let earliest_finish = self.earliest.earliest_finish(idx);
        let latest_start = self.latest.latest_start(idx);

        let free_slack = self
            .graph
            .postrequisites(idx)
            .iter()
            .map(|&q| self.earliest.earliest_start(q))
            .min()
            .unwrap_or_else(|| self.makespan())
            - earliest_finish;

        TaskTiming {
            earliest_start,
            earliest_finish,
            latest_start,
            latest_finish: self.latest.latest_finish(idx),
            slack: latest_start - earliest_start,
            free_slack,
        }
    }

    /// Dates and slack for one task, or `None` if the id is not in the graph.
    pub fn timing(&self, id: &str) -> Option<TaskTiming> {
        self.graph.index_of(id).map(|idx| self.timing_at(idx))
    }

    /// Every task's timing, ordered by earliest start then id.
    pub fn timings(&self) -> Vec<(&str, TaskTiming)> {
        let mut order: Vec<TaskIdx> = self.graph.indices().collect();
        order.sort_by_key(|&idx| (self.earliest.earliest_start(idx), idx));
        order
            .into_iter()
            .map(|idx| (self.graph.id(idx), self.timing_at(idx)))
            .collect()
    }

    pub fn is_critical(&self, id: &str) -> bool {
        self.timing(id).is_some_and(|t| t.is_critical())
    }

    /// Convert into the data contract handed across the Python boundary.
    pub fn to_result(&self) -> ScheduleResult {
        let timings: HashMap<String, TaskTiming> = self
            .graph
            .indices()
            .map(|idx| (self.graph.id(idx).to_string(), self.timing_at(idx)))
            .collect();

        ScheduleResult {
            timings,
            makespan: self.makespan(),
            critical_path: self.critical_path.clone(),
        }
    }
}

/// Build, validate and schedule in one call.
///
/// Fails before any date is computed if the input is malformed.
pub fn compute_schedule<I>(specs: I, config: &PassConfig) -> Result<Schedule, GraphError>
where
    I: IntoIterator<Item = TaskSpec>,
{
    let graph = match TaskGraph::build(specs) {
        Ok(graph) => graph,
        Err(err) => {
            log_summary!(config.verbosity, "validation failed: {}", err);
            return Err(err);
        }
    };
    log_summary!(
        config.verbosity,
        "validated {} task(s), {} edge(s)",
        graph.len(),
        graph.edge_count()
    );
    Ok(Schedule::compute(graph, config))
}
