//! Forward pass: earliest start/finish per task and the project makespan.
//!
//! This is a longest-path computation over the DAG. A task's earliest start is
//! the latest earliest finish among its prerequisites, or 0 if it has none.

use crate::config::PassConfig;
use crate::graph::{TaskGraph, TaskIdx};
use crate::log_summary;
use crate::traversal::{propagate, Direction};

/// Earliest dates for every task of one graph, indexed by [`TaskIdx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarliestDates {
    earliest_start: Vec<i64>,
    earliest_finish: Vec<i64>,
    makespan: i64,
}

impl EarliestDates {
    #[inline]
    pub fn earliest_start(&self, idx: TaskIdx) -> i64 {
        self.earliest_start[idx as usize]
    }

    #[inline]
    pub fn earliest_finish(&self, idx: TaskIdx) -> i64 {
        self.earliest_finish[idx as usize]
    }

    /// Latest earliest finish among tasks with no postrequisites (0 for an empty graph).
    pub fn makespan(&self) -> i64 {
        self.makespan
    }
}

/// Run the forward pass.
///
/// Cannot fail: the graph was validated as acyclic with no dangling
/// references when it was built.
pub fn compute_earliest_dates(graph: &TaskGraph, config: &PassConfig) -> EarliestDates {
    let earliest_start = propagate(graph, Direction::Forward, config, |idx, es| {
        graph
            .prerequisites(idx)
            .iter()
            .map(|&p| es[p as usize] + graph.duration(p))
            .fold(0, i64::max)
    });

    let earliest_finish: Vec<i64> = graph
        .indices()
        .map(|idx| earliest_start[idx as usize] + graph.duration(idx))
        .collect();

    let makespan = graph
        .sinks()
        .map(|idx| earliest_finish[idx as usize])
        .max()
        .unwrap_or(0);

    log_summary!(
        config.verbosity,
        "forward pass ({}): {} task(s), makespan {}",
        config.strategy.as_str(),
        graph.len(),
        makespan
    );

    EarliestDates {
        earliest_start,
        earliest_finish,
        makespan,
    }
}
