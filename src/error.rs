use crate::{grid::Tag, solver::SolverState};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),
  #[error("numerical error: {0}")]
  Numerical(#[from] NumericalError),
  #[error("invariant violation: {0}")]
  Invariant(#[from] InvariantError),
}

impl Error {
  pub fn is_config(&self) -> bool {
    matches!(self, Self::Config(_))
  }
  pub fn is_numerical(&self) -> bool {
    matches!(self, Self::Numerical(_))
  }
  pub fn is_invariant(&self) -> bool {
    matches!(self, Self::Invariant(_))
  }
}

/// Problems in the user supplied setup, detected eagerly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
  #[error("cannot find boundary nodes with tag={0}")]
  TagNotFound(Tag),
  #[error("cannot set field {field:?}, available fields are {available:?}")]
  UnknownField {
    field: String,
    available: Vec<String>,
  },
  #[error("node {node} is constrained but has no value for field {field:?}")]
  MissingFieldValue { node: usize, field: String },
  #[error("parameter {name:?} is required by {context}")]
  MissingParameter { name: String, context: &'static str },
  #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
  DimensionMismatch {
    context: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("invalid grid: {0}")]
  InvalidGrid(String),
  #[error("at least one unknown equation is required, all {0} equations are prescribed")]
  NoUnknowns(usize),
  #[error("cannot find discretization method named {0:?}")]
  UnknownMethod(String),
  #[error("cannot find node distribution named {0:?}")]
  UnknownNodeDistribution(String),
}

/// Failures of the linear algebra backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericalError {
  #[error("factorization of Auu failed: {0}")]
  Factorization(String),
  #[error("linear solve produced non-finite values")]
  NonFiniteSolution,
  #[error("Auu is numerically singular, relative residual {relative:e} of the solution")]
  LargeResidual { relative: f64 },
}

/// Programmer errors: broken preconditions of the API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantError {
  #[error("prescribed index {index} is out of bounds [0,{n})")]
  IndexOutOfBounds { index: usize, n: usize },
  #[error("solver is in state {actual}, but {required} is required")]
  InvalidState {
    required: SolverState,
    actual: SolverState,
  },
}
