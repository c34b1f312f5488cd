//! Task graph construction and structural validation.
//!
//! Tasks live in an arena indexed by [`TaskIdx`]; prerequisites and the derived
//! postrequisites are stored as index lists, so there are no references between
//! tasks. Indices follow sorted id order, which makes every traversal over the
//! arena deterministic regardless of how the caller enumerated the tasks.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::models::TaskSpec;

/// Arena index of a task (u32 for compact storage).
pub type TaskIdx = u32;

/// Structural errors detected while building a graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),
    #[error("Task {task} names unknown prerequisite {prerequisite}")]
    UnknownPrerequisite { task: String, prerequisite: String },
    #[error("Task {task} has negative duration {duration}")]
    NegativeDuration { task: String, duration: i64 },
    /// The summed durations no longer fit an `i64` once `task` is added.
    #[error("Total duration overflows at task {task}")]
    DurationOverflow { task: String },
    /// Ids along one offending cycle, each depending on the next and the last
    /// depending on the first.
    #[error("Circular dependency detected: {}", format_cycle(.0))]
    Cycle(Vec<String>),
}

fn format_cycle(ids: &[String]) -> String {
    let mut out = ids.join(" -> ");
    if let Some(first) = ids.first() {
        out.push_str(" -> ");
        out.push_str(first);
    }
    out
}

/// A validated, immutable project graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    ids: Vec<String>,
    lookup: FxHashMap<String, TaskIdx>,
    durations: Vec<i64>,
    prerequisites: Vec<Vec<TaskIdx>>,
    postrequisites: Vec<Vec<TaskIdx>>,
}

impl TaskGraph {
    /// Build and validate a graph from task specifications.
    ///
    /// Checks run in this order: negative durations, duplicate ids and total
    /// duration overflow (in input order), unknown prerequisites, then cycles.
    /// No path can be longer than the total duration, so once a graph is built
    /// the passes over it stay within `i64`.
    pub fn build<I>(specs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = TaskSpec>,
    {
        let mut specs: Vec<TaskSpec> = specs.into_iter().collect();

        {
            let mut seen: FxHashSet<&str> =
                FxHashSet::with_capacity_and_hasher(specs.len(), Default::default());
            let mut total: i64 = 0;
            for spec in &specs {
                if spec.duration < 0 {
                    return Err(GraphError::NegativeDuration {
                        task: spec.id.clone(),
                        duration: spec.duration,
                    });
                }
                if !seen.insert(spec.id.as_str()) {
                    return Err(GraphError::DuplicateTask(spec.id.clone()));
                }
                total = total.checked_add(spec.duration).ok_or_else(|| {
                    GraphError::DurationOverflow {
                        task: spec.id.clone(),
                    }
                })?;
            }
        }

        specs.sort_by(|a, b| a.id.cmp(&b.id));

        let n = specs.len();
        let lookup: FxHashMap<String, TaskIdx> = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.id.clone(), idx as TaskIdx))
            .collect();

        let mut prerequisites: Vec<Vec<TaskIdx>> = Vec::with_capacity(n);
        for spec in &specs {
            let mut prereqs = Vec::with_capacity(spec.prerequisites.len());
            for prereq in &spec.prerequisites {
                let &idx = lookup
                    .get(prereq)
                    .ok_or_else(|| GraphError::UnknownPrerequisite {
                        task: spec.id.clone(),
                        prerequisite: prereq.clone(),
                    })?;
                prereqs.push(idx);
            }
            prereqs.sort_unstable();
            prereqs.dedup();
            prerequisites.push(prereqs);
        }

        // Visiting tasks in index order keeps every postrequisite list sorted.
        let mut postrequisites: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        for (idx, prereqs) in prerequisites.iter().enumerate() {
            for &p in prereqs {
                postrequisites[p as usize].push(idx as TaskIdx);
            }
        }

        let (ids, durations): (Vec<String>, Vec<i64>) =
            specs.into_iter().map(|s| (s.id, s.duration)).unzip();

        let graph = Self {
            ids,
            lookup,
            durations,
            prerequisites,
            postrequisites,
        };

        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::Cycle(
                cycle.into_iter().map(|idx| graph.id(idx).to_string()).collect(),
            ));
        }

        Ok(graph)
    }

    /// Depth-first search over prerequisites with an in-progress marker per
    /// task. Reaching an in-progress task closes a cycle; the returned indices
    /// run from that task along the current path.
    ///
    /// Uses an explicit stack so deep dependency chains cannot overflow.
    fn find_cycle(&self) -> Option<Vec<TaskIdx>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let n = self.len();
        let mut marks = vec![Mark::Unvisited; n];
        // (task, position of the next prerequisite to examine)
        let mut stack: Vec<(TaskIdx, usize)> = Vec::new();
        let mut path: Vec<TaskIdx> = Vec::new();

        for root in 0..n as TaskIdx {
            if marks[root as usize] != Mark::Unvisited {
                continue;
            }
            marks[root as usize] = Mark::InProgress;
            stack.push((root, 0));
            path.push(root);

            while let Some(frame) = stack.last_mut() {
                let (task, next) = *frame;
                let prereqs = &self.prerequisites[task as usize];

                if next == prereqs.len() {
                    marks[task as usize] = Mark::Done;
                    stack.pop();
                    path.pop();
                    continue;
                }
                frame.1 += 1;

                let prereq = prereqs[next];
                match marks[prereq as usize] {
                    Mark::Done => {}
                    Mark::InProgress => {
                        let start = path.iter().position(|&t| t == prereq).unwrap_or(0);
                        return Some(path[start..].to_vec());
                    }
                    Mark::Unvisited => {
                        marks[prereq as usize] = Mark::InProgress;
                        stack.push((prereq, 0));
                        path.push(prereq);
                    }
                }
            }
        }

        None
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of prerequisite edges (after de-duplication).
    pub fn edge_count(&self) -> usize {
        self.prerequisites.iter().map(Vec::len).sum()
    }

    /// All task indices in id order.
    pub fn indices(&self) -> impl Iterator<Item = TaskIdx> {
        0..self.len() as TaskIdx
    }

    #[inline]
    pub fn id(&self, idx: TaskIdx) -> &str {
        &self.ids[idx as usize]
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<TaskIdx> {
        self.lookup.get(id).copied()
    }

    #[inline]
    pub fn duration(&self, idx: TaskIdx) -> i64 {
        self.durations[idx as usize]
    }

    #[inline]
    pub fn prerequisites(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.prerequisites[idx as usize]
    }

    #[inline]
    pub fn postrequisites(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.postrequisites[idx as usize]
    }

    /// Tasks with no prerequisites.
    pub fn sources(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        self.indices()
            .filter(move |&idx| self.prerequisites(idx).is_empty())
    }

    /// Tasks with no postrequisites.
    pub fn sinks(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        self.indices()
            .filter(move |&idx| self.postrequisites(idx).is_empty())
    }

    /// Forward topological layers: sources first, every task placed one layer
    /// after its latest prerequisite. Each layer is sorted by id.
    pub fn layers(&self) -> Vec<Vec<String>> {
        crate::traversal::layers(self, crate::traversal::Direction::Forward)
            .into_iter()
            .map(|layer| layer.into_iter().map(|idx| self.id(idx).to_string()).collect())
            .collect()
    }

    /// A topological order: the concatenation of [`TaskGraph::layers`].
    pub fn topological_order(&self) -> Vec<String> {
        self.layers().into_iter().flatten().collect()
    }
}
