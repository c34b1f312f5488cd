//! Critical path method (CPM) engine.
//!
//! Builds a validated task graph, runs the forward and backward passes, and
//! extracts the zero-slack critical path. Usable as a Rust library or as the
//! `critpath.rust` Python extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;
use thiserror::Error;

pub mod backward_pass;
pub mod calendar;
mod config;
pub mod critical_path;
pub mod forward_pass;
pub mod graph;
pub mod logging;
mod models;
pub mod traversal;

pub use backward_pass::{compute_latest_dates, LatestDates};
pub use calendar::{project_onto_calendar, CalendarError};
pub use config::{ConfigError, CpmConfig, PassConfig, TraversalStrategy};
pub use critical_path::{compute_schedule, extract, Schedule};
pub use forward_pass::{compute_earliest_dates, EarliestDates};
pub use graph::{GraphError, TaskGraph, TaskIdx};
pub use models::{CalendarTiming, ScheduleResult, TaskSpec, TaskTiming};

/// Any failure surfaced across the Python boundary.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl From<ScheduleError> for PyErr {
    fn from(err: ScheduleError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

fn schedule_with(
    tasks: Vec<TaskSpec>,
    config: Option<CpmConfig>,
) -> Result<Schedule, ScheduleError> {
    let config = config.unwrap_or_default().pass_config()?;
    Ok(compute_schedule(tasks, &config)?)
}

/// Compute earliest/latest dates, slack and the critical path.
///
/// # Arguments
/// * `tasks` - List of TaskSpec (id, duration, prerequisites)
/// * `config` - Optional CpmConfig (strategy, parallel, verbosity)
///
/// # Returns
/// * ScheduleResult with per-task timings, makespan and ordered critical path
///
/// # Raises
/// * ValueError on duplicate ids, unknown prerequisites, negative durations,
///   overflowing total duration, cycles, or an unknown strategy
#[pyfunction]
#[pyo3(signature = (tasks, config=None))]
fn compute_critical_path(
    tasks: Vec<TaskSpec>,
    config: Option<CpmConfig>,
) -> PyResult<ScheduleResult> {
    Ok(schedule_with(tasks, config)?.to_result())
}

/// Group task ids into topological layers (sources first).
///
/// # Raises
/// * ValueError if the tasks do not form a valid DAG
#[pyfunction]
fn topological_layers(tasks: Vec<TaskSpec>) -> PyResult<Vec<Vec<String>>> {
    let graph = TaskGraph::build(tasks).map_err(ScheduleError::from)?;
    Ok(graph.layers())
}

/// Compute the schedule and anchor it at `start_date`, one day per time unit.
///
/// # Returns
/// * List of CalendarTiming ordered by earliest start, then id
///
/// # Raises
/// * ValueError on invalid input or if a date falls outside the calendar range
#[pyfunction]
#[pyo3(signature = (tasks, start_date, config=None))]
fn project_calendar(
    tasks: Vec<TaskSpec>,
    start_date: NaiveDate,
    config: Option<CpmConfig>,
) -> PyResult<Vec<CalendarTiming>> {
    let schedule = schedule_with(tasks, config)?;
    let rows = project_onto_calendar(&schedule, start_date).map_err(ScheduleError::from)?;
    Ok(rows)
}

/// The critpath.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<TaskSpec>()?;
    m.add_class::<TaskTiming>()?;
    m.add_class::<ScheduleResult>()?;
    m.add_class::<CalendarTiming>()?;

    // Config types
    m.add_class::<CpmConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(compute_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(topological_layers, m)?)?;
    m.add_function(wrap_pyfunction!(project_calendar, m)?)?;

    Ok(())
}
