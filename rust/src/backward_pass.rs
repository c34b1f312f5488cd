//! Backward pass: latest start/finish per task.

use crate::config::PassConfig;
use crate::graph::{TaskGraph, TaskIdx};
use crate::log_summary;
use crate::traversal::{propagate, Direction};

/// Latest dates for every task of one graph, indexed by [`TaskIdx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestDates {
    latest_start: Vec<i64>,
    latest_finish: Vec<i64>,
}

impl LatestDates {
    #[inline]
    pub fn latest_start(&self, idx: TaskIdx) -> i64 {
        self.latest_start[idx as usize]
    }

    #[inline]
    pub fn latest_finish(&self, idx: TaskIdx) -> i64 {
        self.latest_finish[idx as usize]
    }
}

/// Run the backward pass anchored at `makespan`.
///
/// A task with no postrequisites must finish by the makespan; any other task
/// must finish before the earliest latest start among its postrequisites.
/// `makespan` is normally [`EarliestDates::makespan`](crate::EarliestDates::makespan);
/// passing a later anchor shifts every latest date by the difference.
pub fn compute_latest_dates(
    graph: &TaskGraph,
    makespan: i64,
    config: &PassConfig,
) -> LatestDates {
    let latest_finish = propagate(graph, Direction::Backward, config, |idx, lf| {
        graph
            .postrequisites(idx)
            .iter()
            .map(|&q| lf[q as usize] - graph.duration(q))
            .min()
            .unwrap_or(makespan)
    });

    let latest_start: Vec<i64> = graph
        .indices()
        .map(|idx| latest_finish[idx as usize] - graph.duration(idx))
        .collect();

    log_summary!(
        config.verbosity,
        "backward pass ({}): anchored at {}",
        config.strategy.as_str(),
        makespan
    );

    LatestDates {
        latest_start,
        latest_finish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraversalStrategy;
    use crate::forward_pass::compute_earliest_dates;
    use crate::models::TaskSpec;

    fn make_task(id: &str, duration: i64, deps: &[&str]) -> TaskSpec {
        TaskSpec::new(id, duration, deps.iter().copied())
    }

    fn project() -> TaskGraph {
        TaskGraph::build(vec![
            make_task("A", 2, &[]),
            make_task("B", 3, &["A"]),
            make_task("C", 3, &["A"]),
            make_task("D", 2, &["B"]),
            make_task("E", 1, &["C"]),
            make_task("F", 3, &["D", "E"]),
        ])
        .unwrap()
    }

    fn dates_of(graph: &TaskGraph, dates: &LatestDates, id: &str) -> (i64, i64) {
        let idx = graph.index_of(id).unwrap();
        (dates.latest_start(idx), dates.latest_finish(idx))
    }

    #[test]
    fn test_project_latest_dates() {
        let graph = project();
        let config = PassConfig::default();
        let earliest = compute_earliest_dates(&graph, &config);
        let latest = compute_latest_dates(&graph, earliest.makespan(), &config);

        assert_eq!(dates_of(&graph, &latest, "F"), (7, 10));
        assert_eq!(dates_of(&graph, &latest, "D"), (5, 7));
        assert_eq!(dates_of(&graph, &latest, "E"), (6, 7));
        assert_eq!(dates_of(&graph, &latest, "B"), (2, 5));
        assert_eq!(dates_of(&graph, &latest, "C"), (3, 6));
        assert_eq!(dates_of(&graph, &latest, "A"), (0, 2));
    }

    #[test]
    fn test_all_strategies_agree() {
        let graph = project();
        let makespan = compute_earliest_dates(&graph, &PassConfig::default()).makespan();

        let layered = compute_latest_dates(&graph, makespan, &PassConfig::default());
        let memoized = compute_latest_dates(
            &graph,
            makespan,
            &PassConfig {
                strategy: TraversalStrategy::Memoized,
                ..PassConfig::default()
            },
        );
        let parallel = compute_latest_dates(
            &graph,
            makespan,
            &PassConfig {
                parallel: true,
                min_parallel_layer: 1,
                ..PassConfig::default()
            },
        );

        assert_eq!(layered, memoized);
        assert_eq!(layered, parallel);
    }

    #[test]
    fn test_isolated_task_anchored_at_makespan() {
        let graph = TaskGraph::build(vec![
            make_task("a", 4, &[]),
            make_task("b", 6, &["a"]),
            make_task("lonely", 3, &[]),
        ])
        .unwrap();
        let config = PassConfig::default();
        let makespan = compute_earliest_dates(&graph, &config).makespan();
        let latest = compute_latest_dates(&graph, makespan, &config);

        assert_eq!(makespan, 10);
        assert_eq!(dates_of(&graph, &latest, "lonely"), (7, 10));
    }

    #[test]
    fn test_later_anchor_shifts_dates() {
        let graph = project();
        let config = PassConfig::default();
        let on_time = compute_latest_dates(&graph, 10, &config);
        let relaxed = compute_latest_dates(&graph, 13, &config);

        for idx in graph.indices() {
            assert_eq!(relaxed.latest_start(idx), on_time.latest_start(idx) + 3);
            assert_eq!(relaxed.latest_finish(idx), on_time.latest_finish(idx) + 3);
        }
    }
}
