//! Configuration types for the forward and backward passes.

use pyo3::prelude::*;
use thiserror::Error;

/// Errors raised while validating a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown traversal strategy: {0} (expected \"layered\" or \"memoized\")")]
    UnknownStrategy(String),
}

/// How a pass walks the graph.
///
/// Both strategies resolve every task from already-resolved neighbours and
/// produce identical dates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalStrategy {
    /// Kahn-style frontier expansion, one topological layer at a time.
    #[default]
    Layered,
    /// Depth-first resolution with a per-task computed flag, driven by an
    /// explicit worklist instead of recursion.
    Memoized,
}

impl TraversalStrategy {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "layered" => Ok(Self::Layered),
            "memoized" => Ok(Self::Memoized),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Layered => "layered",
            Self::Memoized => "memoized",
        }
    }
}

/// Typed configuration consumed by the passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassConfig {
    pub strategy: TraversalStrategy,
    /// Resolve large layers on the rayon pool. Only meaningful for `Layered`.
    pub parallel: bool,
    /// Layers with fewer tasks than this are resolved on the calling thread.
    pub min_parallel_layer: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=layers, 3=debug.
    pub verbosity: u8,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            strategy: TraversalStrategy::Layered,
            parallel: false,
            min_parallel_layer: 64,
            verbosity: 0,
        }
    }
}

/// Configuration as seen from Python: the strategy is a plain string and is
/// only checked when converted with [`CpmConfig::pass_config`].
#[pyclass]
#[derive(Clone, Debug)]
pub struct CpmConfig {
    /// Traversal strategy: "layered" or "memoized"
    #[pyo3(get, set)]
    pub strategy: String,
    /// Resolve independent tasks of one layer in parallel
    #[pyo3(get, set)]
    pub parallel: bool,
    /// Minimum layer size before parallel resolution kicks in
    #[pyo3(get, set)]
    pub min_parallel_layer: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=layers, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for CpmConfig {
    fn default() -> Self {
        let defaults = PassConfig::default();
        Self {
            strategy: defaults.strategy.as_str().to_string(),
            parallel: defaults.parallel,
            min_parallel_layer: defaults.min_parallel_layer,
            verbosity: defaults.verbosity,
        }
    }
}

impl CpmConfig {
    /// Validate and convert into the typed pass configuration.
    pub fn pass_config(&self) -> Result<PassConfig, ConfigError> {
        Ok(PassConfig {
            strategy: TraversalStrategy::parse(&self.strategy)?,
            parallel: self.parallel,
            min_parallel_layer: self.min_parallel_layer,
            verbosity: self.verbosity,
        })
    }
}

#[pymethods]
impl CpmConfig {
    #[new]
    #[pyo3(signature = (
        strategy=None,
        parallel=None,
        min_parallel_layer=None,
        verbosity=None
    ))]
    fn py_new(
        strategy: Option<String>,
        parallel: Option<bool>,
        min_parallel_layer: Option<usize>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            strategy: strategy.unwrap_or(defaults.strategy),
            parallel: parallel.unwrap_or(defaults.parallel),
            min_parallel_layer: min_parallel_layer.unwrap_or(defaults.min_parallel_layer),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CpmConfig(strategy={:?}, parallel={}, min_parallel_layer={}, verbosity={})",
            self.strategy, self.parallel, self.min_parallel_layer, self.verbosity
        )
    }
}
