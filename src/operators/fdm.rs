use super::SourceFn;
use crate::{
  assemble::assemble_rows,
  dofs::EqIdx,
  error::ConfigError,
  grid::{linear_index2cartesian_index, RectGrid},
  params::{Coefficients, Params},
  sparse::Triplet,
};

use std::fmt;
use tracing::{debug, warn};

/// Finite difference Laplacian on a rectilinear grid.
///
/// Five point stencil in 2D and seven point stencil in 3D, ordered as
/// `{center, left, right, bottom, top, back, front}`, with weights
/// `alpha = 2 sum_d k_d/h_d^2` at the center and `-k_d/h_d^2` at the neighbors.
///
/// On the boundary the missing outward neighbor is replaced by the opposite
/// inner one. Without a prescribed value this amounts to a zero flux condition.
pub struct FdmLaplacian {
  coeffs: Coefficients,
  source: Option<Box<SourceFn>>,
}

impl FdmLaplacian {
  pub fn new(params: &Params) -> Result<Self, ConfigError> {
    let coeffs = Coefficients::from_params(params, "FdmLaplacian")?;
    Ok(Self::from_coefficients(coeffs))
  }
  pub fn from_coefficients(coeffs: Coefficients) -> Self {
    Self {
      coeffs,
      source: None,
    }
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
  pub fn source(&self) -> Option<&SourceFn> {
    self.source.as_deref()
  }

  /// Entries of the given full rows.
  pub fn assemble(&self, grid: &RectGrid, rows: &[EqIdx]) -> Result<Vec<Triplet>, ConfigError> {
    let ndim = grid.ndim();
    let npts = grid.npts();
    let spacing = grid.spacing();

    let mut weights = Vec::with_capacity(ndim);
    for d in 0..ndim {
      if !grid.is_uniform(d) {
        warn!("FDM on non-uniform axis {d}, using mean spacing {}", spacing[d]);
      }
      let k = self.coeffs.along(d, "FdmLaplacian")?;
      weights.push(k / (spacing[d] * spacing[d]));
    }
    let alpha = 2.0 * weights.iter().sum::<f64>();

    let triplets = assemble_rows(rows, |inode| {
      let cart_idx = linear_index2cartesian_index(inode, &npts);
      let mut entries = Vec::with_capacity(1 + 2 * ndim);
      entries.push((inode, inode, alpha));

      let mut stride = 1;
      for d in 0..ndim {
        let (i, n) = (cart_idx[d], npts[d]);
        let left = if i == 0 { i + 1 } else { i - 1 };
        let right = if i == n - 1 { i - 1 } else { i + 1 };
        let base = inode - i * stride;
        entries.push((inode, base + left * stride, -weights[d]));
        entries.push((inode, base + right * stride, -weights[d]));
        stride *= n;
      }
      entries
    });
    debug!(
      "assembled {} FDM triplets for {} rows",
      triplets.len(),
      rows.len()
    );
    Ok(triplets)
  }
}

impl fmt::Debug for FdmLaplacian {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FdmLaplacian")
      .field("coeffs", &self.coeffs)
      .field("source", &self.source.is_some())
      .finish()
  }
}
