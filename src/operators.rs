//! Discretized differential operators.
//!
//! Both variants assemble the negative anisotropic Laplacian
//! $L{u} = - k_x (partial^2 u)/(partial x^2) - k_y (partial^2 u)/(partial y^2) - k_z (partial^2 u)/(partial z^2)$.

pub mod fdm;
pub mod spc;

pub use fdm::FdmLaplacian;
pub use spc::SpcLaplacian;

use crate::{
  assemble::RowBlock,
  dofs::DofMap,
  error::ConfigError,
  grid::RectGrid,
  linalg::Vector,
  params::Params,
  sparse::Triplet,
};

use std::{fmt, str::FromStr};

/// Source term `s(x, t)` on the right-hand side of `L{u} = s`.
pub type SourceFn = dyn Fn(&na::DVector<f64>, f64) -> f64 + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  FiniteDifference,
  SpectralCollocation,
}

impl FromStr for Method {
  type Err = ConfigError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "fdm" => Ok(Self::FiniteDifference),
      "spc" => Ok(Self::SpectralCollocation),
      _ => Err(ConfigError::UnknownMethod(s.to_string())),
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::FiniteDifference => write!(f, "fdm"),
      Self::SpectralCollocation => write!(f, "spc"),
    }
  }
}

pub enum Operator {
  Fdm(FdmLaplacian),
  Spc(SpcLaplacian),
}

impl Operator {
  pub fn method(&self) -> Method {
    match self {
      Self::Fdm(_) => Method::FiniteDifference,
      Self::Spc(_) => Method::SpectralCollocation,
    }
  }

  /// Finite difference Laplacian with coefficients `kx`, `ky` (and `kz`) from `params`.
  pub fn fdm(params: &Params) -> Result<Self, ConfigError> {
    FdmLaplacian::new(params).map(Self::Fdm)
  }

  pub fn with_source(
    self,
    source: impl Fn(&na::DVector<f64>, f64) -> f64 + Send + Sync + 'static,
  ) -> Self {
    match self {
      Self::Fdm(op) => Self::Fdm(op.with_source(source)),
      Self::Spc(op) => Self::Spc(op.with_source(source)),
    }
  }

  /// Entries `(I, J, value)` of every row of `rows`, in full numbering.
  pub fn assemble(
    &self,
    grid: &RectGrid,
    dofs: &DofMap,
    rows: RowBlock,
  ) -> Result<Vec<Triplet>, ConfigError> {
    let rows = rows.rows(dofs);
    match self {
      Self::Fdm(op) => op.assemble(grid, rows),
      Self::Spc(op) => op.assemble(grid, rows),
    }
  }

  pub fn source(&self) -> Option<&SourceFn> {
    match self {
      Self::Fdm(op) => op.source(),
      Self::Spc(op) => op.source(),
    }
  }

  /// Adds the source term at the unknown nodes into `bu`.
  pub fn add_source_term(&self, grid: &RectGrid, dofs: &DofMap, time: f64, bu: &mut Vector) {
    let Some(source) = self.source() else {
      return;
    };
    assert_eq!(bu.len(), dofs.nunknown());
    for (iu, &inode) in dofs.unknown_to_full().iter().enumerate() {
      bu[iu] += source(&grid.node_coords(inode), time);
    }
  }
}

impl fmt::Debug for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Fdm(op) => f.debug_tuple("Fdm").field(op).finish(),
      Self::Spc(op) => f.debug_tuple("Spc").field(op).finish(),
    }
  }
}

impl From<FdmLaplacian> for Operator {
  fn from(op: FdmLaplacian) -> Self {
    Self::Fdm(op)
  }
}
impl From<SpcLaplacian> for Operator {
  fn from(op: SpcLaplacian) -> Self {
    Self::Spc(op)
  }
}
