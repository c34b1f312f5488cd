//! Direction-generic propagation over a validated [`TaskGraph`].
//!
//! Both passes compute one integer per task from the values of its
//! "upstream" neighbours: prerequisites for the forward pass, postrequisites
//! for the backward pass. The graph is acyclic by construction, so every
//! strategy here terminates and visits each task and edge a bounded number
//! of times.

use rayon::prelude::*;

use crate::config::{PassConfig, TraversalStrategy};
use crate::graph::{TaskGraph, TaskIdx};
use crate::{log_debug, log_layers};

/// Which way values flow through the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sources to sinks, reading prerequisites.
    Forward,
    /// Sinks to sources, reading postrequisites.
    Backward,
}

impl Direction {
    /// Neighbours a task's value is computed from.
    #[inline]
    pub fn upstream(self, graph: &TaskGraph, idx: TaskIdx) -> &[TaskIdx] {
        match self {
            Self::Forward => graph.prerequisites(idx),
            Self::Backward => graph.postrequisites(idx),
        }
    }

    /// Neighbours that read this task's value.
    #[inline]
    pub fn downstream(self, graph: &TaskGraph, idx: TaskIdx) -> &[TaskIdx] {
        match self {
            Self::Forward => graph.postrequisites(idx),
            Self::Backward => graph.prerequisites(idx),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// Split the graph into topological layers using Kahn's algorithm.
///
/// Layer 0 holds every task with no upstream neighbours; each following layer
/// holds the tasks whose last upstream neighbour sits in the previous layer.
/// Tasks within a layer are mutually independent and sorted by index.
pub fn layers(graph: &TaskGraph, direction: Direction) -> Vec<Vec<TaskIdx>> {
    let mut remaining: Vec<usize> = graph
        .indices()
        .map(|idx| direction.upstream(graph, idx).len())
        .collect();

    let mut current: Vec<TaskIdx> = graph
        .indices()
        .filter(|&idx| remaining[idx as usize] == 0)
        .collect();
    let mut layers: Vec<Vec<TaskIdx>> = Vec::new();
    let mut placed = 0;

    while !current.is_empty() {
        let mut next = Vec::new();
        for &task in &current {
            for &dependent in direction.downstream(graph, task) {
                let count = &mut remaining[dependent as usize];
                *count -= 1;
                if *count == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort_unstable();
        placed += current.len();
        layers.push(std::mem::replace(&mut current, next));
    }

    debug_assert_eq!(placed, graph.len(), "validated graph must be acyclic");
    layers
}

/// Compute one value per task, resolving each task only after all of its
/// upstream neighbours.
///
/// `resolve(idx, values)` may read `values` only at the upstream neighbours of
/// `idx`; those slots are guaranteed final when it is called. Every slot is
/// written exactly once.
pub(crate) fn propagate<F>(
    graph: &TaskGraph,
    direction: Direction,
    config: &PassConfig,
    resolve: F,
) -> Vec<i64>
where
    F: Fn(TaskIdx, &[i64]) -> i64 + Sync,
{
    match config.strategy {
        TraversalStrategy::Layered => propagate_layered(graph, direction, config, &resolve),
        TraversalStrategy::Memoized => propagate_memoized(graph, direction, config, &resolve),
    }
}

/// Frontier expansion, one layer at a time.
///
/// A layer's results are collected in full before any of them is written
/// back, so the collect is the barrier between layers when the layer is
/// resolved on the rayon pool.
fn propagate_layered<F>(
    graph: &TaskGraph,
    direction: Direction,
    config: &PassConfig,
    resolve: &F,
) -> Vec<i64>
where
    F: Fn(TaskIdx, &[i64]) -> i64 + Sync,
{
    let mut values = vec![0i64; graph.len()];

    for (depth, layer) in layers(graph, direction).iter().enumerate() {
        let parallel = config.parallel && layer.len() >= config.min_parallel_layer.max(1);
        log_layers!(
            config.verbosity,
            "{} layer {}: {} task(s){}",
            direction.label(),
            depth,
            layer.len(),
            if parallel { " [parallel]" } else { "" }
        );

        let resolved: Vec<(TaskIdx, i64)> = if parallel {
            let snapshot: &[i64] = &values;
            layer
                .par_iter()
                .map(|&idx| (idx, resolve(idx, snapshot)))
                .collect()
        } else {
            layer.iter().map(|&idx| (idx, resolve(idx, &values))).collect()
        };

        for (idx, value) in resolved {
            log_debug!(
                config.verbosity,
                "  {} {} = {}",
                direction.label(),
                graph.id(idx),
                value
            );
            values[idx as usize] = value;
        }
    }

    values
}

/// Depth-first resolution with a computed flag per task.
///
/// A task is expanded the first time it reaches the top of the worklist, which
/// pushes its unresolved upstream neighbours; when it surfaces again they are
/// all resolved and the task itself is computed. Expanded-but-unresolved tasks
/// always form a single dependency chain on the worklist, so no task is
/// expanded twice.
fn propagate_memoized<F>(
    graph: &TaskGraph,
    direction: Direction,
    config: &PassConfig,
    resolve: &F,
) -> Vec<i64>
where
    F: Fn(TaskIdx, &[i64]) -> i64 + Sync,
{
    let n = graph.len();
    let mut values = vec![0i64; n];
    let mut computed = vec![false; n];
    let mut expanded = vec![false; n];
    let mut worklist: Vec<TaskIdx> = Vec::new();

    for root in graph.indices() {
        if computed[root as usize] {
            continue;
        }
        worklist.push(root);

        while let Some(&task) = worklist.last() {
            let t = task as usize;
            if computed[t] {
                worklist.pop();
                continue;
            }
            if !expanded[t] {
                expanded[t] = true;
                worklist.extend(
                    direction
                        .upstream(graph, task)
                        .iter()
                        .copied()
                        .filter(|&u| !computed[u as usize]),
                );
                continue;
            }

            let value = resolve(task, &values);
            log_debug!(
                config.verbosity,
                "  {} {} = {}",
                direction.label(),
                graph.id(task),
                value
            );
            values[t] = value;
            computed[t] = true;
            worklist.pop();
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskSpec;

    fn make_task(id: &str, duration: i64, deps: &[&str]) -> TaskSpec {
        TaskSpec::new(id, duration, deps.iter().copied())
    }

    fn config(strategy: TraversalStrategy, parallel: bool) -> PassConfig {
        PassConfig {
            strategy,
            parallel,
            min_parallel_layer: 1,
            verbosity: 0,
        }
    }

    /// Longest chain (in task count) ending at each task.
    fn depth(graph: &TaskGraph, config: &PassConfig) -> Vec<i64> {
        propagate(graph, Direction::Forward, config, |idx, values| {
            graph
                .prerequisites(idx)
                .iter()
                .map(|&p| values[p as usize] + 1)
                .max()
                .unwrap_or(0)
        })
    }

    #[test]
    fn test_backward_layers_start_at_sinks() {
        let graph = TaskGraph::build(vec![
            make_task("a", 1, &[]),
            make_task("b", 1, &["a"]),
            make_task("c", 1, &["a"]),
        ])
        .unwrap();
        let a = graph.index_of("a").unwrap();
        let b = graph.index_of("b").unwrap();
        let c = graph.index_of("c").unwrap();
        assert_eq!(layers(&graph, Direction::Backward), vec![vec![b, c], vec![a]]);
        assert_eq!(layers(&graph, Direction::Forward), vec![vec![a], vec![b, c]]);
    }

    #[test]
    fn test_strategies_agree() {
        let graph = TaskGraph::build(vec![
            make_task("a", 1, &[]),
            make_task("b", 1, &["a"]),
            make_task("c", 1, &["b"]),
            make_task("d", 1, &["a"]),
            make_task("e", 1, &["c", "d"]),
            make_task("f", 1, &[]),
        ])
        .unwrap();

        let layered = depth(&graph, &config(TraversalStrategy::Layered, false));
        let memoized = depth(&graph, &config(TraversalStrategy::Memoized, false));
        let parallel = depth(&graph, &config(TraversalStrategy::Layered, true));

        assert_eq!(layered, vec![0, 1, 2, 1, 3, 0]);
        assert_eq!(layered, memoized);
        assert_eq!(layered, parallel);
    }

    #[test]
    fn test_memoized_deep_chain_is_stack_safe() {
        let n = 100_000;
        let specs = (0..n).map(|i| {
            let prereqs: Vec<String> = if i == 0 {
                Vec::new()
            } else {
                vec![format!("t{:06}", i - 1)]
            };
            TaskSpec::new(format!("t{:06}", i), 1, prereqs)
        });
        let graph = TaskGraph::build(specs).unwrap();

        let values = depth(&graph, &config(TraversalStrategy::Memoized, false));
        assert_eq!(values[n - 1], (n - 1) as i64);
    }

    #[test]
    fn test_wide_layer_in_parallel() {
        let mut tasks: Vec<TaskSpec> = vec![TaskSpec::new("root", 1, Vec::<String>::new())];
        for i in 0..500 {
            tasks.push(TaskSpec::new(format!("leaf{:03}", i), 1, ["root"]));
        }
        let graph = TaskGraph::build(tasks).unwrap();

        let sequential = depth(&graph, &config(TraversalStrategy::Layered, false));
        for _ in 0..5 {
            assert_eq!(
                depth(&graph, &config(TraversalStrategy::Layered, true)),
                sequential
            );
        }
    }
}
