//! Core data types for the critical path engine.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

// Note: We use std HashMap here for PyO3 interface compatibility

/// One task as supplied by the caller: id, duration and prerequisite ids.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSpec {
    #[pyo3(get, set)]
    pub id: String,
    /// Duration in time units. Negative values are rejected when the graph is built.
    #[pyo3(get, set)]
    pub duration: i64,
    #[pyo3(get, set)]
    pub prerequisites: Vec<String>,
}

impl TaskSpec {
    pub fn new<I, S>(id: impl Into<String>, duration: i64, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            duration,
            prerequisites: prerequisites.into_iter().map(Into::into).collect(),
        }
    }
}

#[pymethods]
impl TaskSpec {
    #[new]
    #[pyo3(signature = (id, duration, prerequisites=None))]
    fn py_new(id: String, duration: i64, prerequisites: Option<Vec<String>>) -> Self {
        Self {
            id,
            duration,
            prerequisites: prerequisites.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskSpec(id={:?}, duration={}, prerequisites={:?})",
            self.id, self.duration, self.prerequisites
        )
    }
}

/// Per-task dates produced by the forward and backward passes.
#[pyclass]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start time (from forward pass).
    #[pyo3(get)]
    pub earliest_start: i64,
    /// Earliest possible finish time (from forward pass).
    #[pyo3(get)]
    pub earliest_finish: i64,
    /// Latest allowable start time (from backward pass).
    #[pyo3(get)]
    pub latest_start: i64,
    /// Latest allowable finish time (from backward pass).
    #[pyo3(get)]
    pub latest_finish: i64,
    /// Total slack = latest_start - earliest_start.
    #[pyo3(get)]
    pub slack: i64,
    /// Slip available before any postrequisite's earliest start moves.
    #[pyo3(get)]
    pub free_slack: i64,
}

#[pymethods]
impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(es={}, ef={}, ls={}, lf={}, slack={})",
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.slack
        )
    }
}

/// Full schedule handed back across the Python boundary.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleResult {
    #[pyo3(get)]
    pub timings: HashMap<String, TaskTiming>,
    #[pyo3(get)]
    pub makespan: i64,
    /// Zero-slack task ids ordered by earliest start, then id.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
}

#[pymethods]
impl ScheduleResult {
    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(tasks={}, makespan={}, critical_path={:?})",
            self.timings.len(),
            self.makespan,
            self.critical_path
        )
    }
}

/// Schedule dates for one task, anchored at a project start date.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarTiming {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub earliest_start: NaiveDate,
    #[pyo3(get)]
    pub earliest_finish: NaiveDate,
    #[pyo3(get)]
    pub latest_start: NaiveDate,
    #[pyo3(get)]
    pub latest_finish: NaiveDate,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl CalendarTiming {
    fn __repr__(&self) -> String {
        format!(
            "CalendarTiming(task_id={:?}, start={}, end={}, critical={})",
            self.task_id, self.earliest_start, self.earliest_finish, self.is_critical
        )
    }
}
