use super::SourceFn;
use crate::{
  assemble::assemble_rows,
  dofs::EqIdx,
  error::ConfigError,
  grid::{linear_index2cartesian_index, RectGrid},
  linalg::Matrix,
  params::{Coefficients, Params},
  spectral::LagrangeInterp,
  sparse::Triplet,
};

use std::fmt;
use tracing::debug;

/// Spectral collocation Laplacian.
///
/// Tensor product of the per-axis second derivative matrices `D2_d`:
/// row `I` receives `-k_d D2_d[(i_d, j)]` at every node `J` that differs
/// from `I` only in its `d`-th cartesian index `j`.
pub struct SpcLaplacian {
  coeffs: Coefficients,
  d2: Vec<Matrix>,
  source: Option<Box<SourceFn>>,
}

impl SpcLaplacian {
  pub fn new(params: &Params, d2: Vec<Matrix>) -> Result<Self, ConfigError> {
    let coeffs = Coefficients::from_params(params, "SpcLaplacian")?;
    Self::from_coefficients(coeffs, d2)
  }

  pub fn from_interpolators(params: &Params, lips: &[LagrangeInterp]) -> Result<Self, ConfigError> {
    Self::new(params, lips.iter().map(|lip| lip.d2().clone()).collect())
  }

  pub fn from_coefficients(coeffs: Coefficients, d2: Vec<Matrix>) -> Result<Self, ConfigError> {
    for m in &d2 {
      if m.nrows() != m.ncols() {
        return Err(ConfigError::DimensionMismatch {
          context: "SpcLaplacian D2 matrix",
          expected: m.nrows(),
          actual: m.ncols(),
        });
      }
    }
    Ok(Self {
      coeffs,
      d2,
      source: None,
    })
  }

  pub fn with_source(
    mut self,
    source: impl Fn(&na::DVector<f64>, f64) -> f64 + Send + Sync + 'static,
  ) -> Self {
    self.source = Some(Box::new(source));
    self
  }

  pub fn coefficients(&self) -> &Coefficients {
    &self.coeffs
  }
  pub fn d2(&self) -> &[Matrix] {
    &self.d2
  }
  pub fn source(&self) -> Option<&SourceFn> {
    self.source.as_deref()
  }

  fn check_grid(&self, grid: &RectGrid) -> Result<(), ConfigError> {
    if self.d2.len() != grid.ndim() {
      return Err(ConfigError::DimensionMismatch {
        context: "SpcLaplacian axes",
        expected: grid.ndim(),
        actual: self.d2.len(),
      });
    }
    for (m, n) in self.d2.iter().zip(grid.npts()) {
      if m.nrows() != n {
        return Err(ConfigError::DimensionMismatch {
          context: "SpcLaplacian points per axis",
          expected: n,
          actual: m.nrows(),
        });
      }
    }
    Ok(())
  }

  /// Entries of the given full rows.
  pub fn assemble(&self, grid: &RectGrid, rows: &[EqIdx]) -> Result<Vec<Triplet>, ConfigError> {
    self.check_grid(grid)?;
    let npts = grid.npts();
    let coeffs = (0..grid.ndim())
      .map(|d| self.coeffs.along(d, "SpcLaplacian"))
      .collect::<Result<Vec<_>, _>>()?;

    let triplets = assemble_rows(rows, |inode| {
      let cart_idx = linear_index2cartesian_index(inode, &npts);
      let mut entries = Vec::with_capacity(npts.iter().sum());
      let mut stride = 1;
      for (d, d2) in self.d2.iter().enumerate() {
        let i = cart_idx[d];
        let base = inode - i * stride;
        for j in 0..npts[d] {
          let value = -coeffs[d] * d2[(i, j)];
          if value != 0.0 {
            entries.push((inode, base + j * stride, value));
          }
        }
        stride *= npts[d];
      }
      entries
    });
    debug!(
      "assembled {} SPC triplets for {} rows",
      triplets.len(),
      rows.len()
    );
    Ok(triplets)
  }
}

impl fmt::Debug for SpcLaplacian {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SpcLaplacian")
      .field("coeffs", &self.coeffs)
      .field("npts", &self.d2.iter().map(|m| m.nrows()).collect::<Vec<_>>())
      .field("source", &self.source.is_some())
      .finish()
  }
}
