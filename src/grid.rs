//! Structured rectilinear grids with lexicographically ordered nodes.
//!
//! The first axis runs fastest: in 2D node `i + nx*j` sits at `(x_i, y_j)`.
//! Boundary sides are identified by integer tags, `10*(axis+1)` for the
//! minimum side and `10*(axis+1)+1` for the maximum side.

use crate::error::ConfigError;

use indexmap::IndexMap;

pub type NodeIdx = usize;
pub type Tag = i32;

pub mod tag {
  use super::Tag;

  pub const XMIN: Tag = 10;
  pub const XMAX: Tag = 11;
  pub const YMIN: Tag = 20;
  pub const YMAX: Tag = 21;
  pub const ZMIN: Tag = 30;
  pub const ZMAX: Tag = 31;

  pub fn of_side(axis: usize, is_max: bool) -> Tag {
    10 * (axis as Tag + 1) + Tag::from(is_max)
  }
}

/// converts linear index to cartesian index
pub fn linear_index2cartesian_index(mut lin_idx: usize, npts: &[usize]) -> Vec<usize> {
  let mut cart_idx = vec![0; npts.len()];
  for (icomp, &n) in npts.iter().enumerate() {
    cart_idx[icomp] = lin_idx % n;
    lin_idx /= n;
  }
  cart_idx
}

/// converts cartesian index to linear index
pub fn cartesian_index2linear_index(cart_idx: &[usize], npts: &[usize]) -> usize {
  assert_eq!(cart_idx.len(), npts.len());
  let mut lin_idx = 0;
  for icomp in (0..npts.len()).rev() {
    lin_idx *= npts[icomp];
    lin_idx += cart_idx[icomp];
  }
  lin_idx
}

#[derive(Debug, Clone)]
pub struct RectGrid {
  axes: Vec<Vec<f64>>,
  boundaries: IndexMap<Tag, Vec<NodeIdx>>,
}

// constructors
impl RectGrid {
  /// Evenly spaced grid with `ndiv[d]` divisions along axis `d`.
  pub fn new_uniform(min: &[f64], max: &[f64], ndiv: &[usize]) -> Result<Self, ConfigError> {
    if min.len() != max.len() || min.len() != ndiv.len() {
      return Err(ConfigError::InvalidGrid(format!(
        "min, max and ndiv must have equal lengths, got {}, {} and {}",
        min.len(),
        max.len(),
        ndiv.len()
      )));
    }
    let axes = (0..min.len())
      .map(|d| {
        let n = ndiv[d];
        let h = if n == 0 { 0.0 } else { (max[d] - min[d]) / n as f64 };
        (0..=n)
          .map(|i| if i == n { max[d] } else { min[d] + i as f64 * h })
          .collect()
      })
      .collect();
    Self::from_axes(axes)
  }

  /// Grid from explicit per-axis coordinates.
  pub fn from_axes(axes: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
    let ndim = axes.len();
    if !(1..=3).contains(&ndim) {
      return Err(ConfigError::InvalidGrid(format!(
        "dimension must be 1, 2 or 3, got {ndim}"
      )));
    }
    for (d, axis) in axes.iter().enumerate() {
      if axis.len() < 2 {
        return Err(ConfigError::InvalidGrid(format!(
          "axis {d} needs at least two points, got {}",
          axis.len()
        )));
      }
      if axis.iter().any(|x| !x.is_finite()) || axis.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::InvalidGrid(format!(
          "coordinates along axis {d} must be finite and strictly increasing"
        )));
      }
    }

    let npts: Vec<_> = axes.iter().map(|a| a.len()).collect();
    let nnodes = npts.iter().product::<usize>();
    let mut boundaries = IndexMap::new();
    for axis in 0..ndim {
      for is_max in [false, true] {
        let side = if is_max { npts[axis] - 1 } else { 0 };
        let nodes: Vec<_> = (0..nnodes)
          .filter(|&inode| linear_index2cartesian_index(inode, &npts)[axis] == side)
          .collect();
        boundaries.insert(tag::of_side(axis, is_max), nodes);
      }
    }

    Ok(Self { axes, boundaries })
  }
}

// getters
impl RectGrid {
  pub fn ndim(&self) -> usize {
    self.axes.len()
  }
  pub fn axes(&self) -> &[Vec<f64>] {
    &self.axes
  }
  pub fn axis(&self, d: usize) -> &[f64] {
    &self.axes[d]
  }
  pub fn npts(&self) -> Vec<usize> {
    self.axes.iter().map(|a| a.len()).collect()
  }
  pub fn nnodes(&self) -> usize {
    self.axes.iter().map(|a| a.len()).product()
  }
  pub fn min(&self) -> Vec<f64> {
    self.axes.iter().map(|a| a[0]).collect()
  }
  pub fn max(&self) -> Vec<f64> {
    self.axes.iter().map(|a| a[a.len() - 1]).collect()
  }
  /// Axis length divided by the number of divisions along that axis.
  pub fn spacing(&self) -> Vec<f64> {
    self
      .axes
      .iter()
      .map(|a| (a[a.len() - 1] - a[0]) / (a.len() - 1) as f64)
      .collect()
  }
  pub fn is_uniform(&self, d: usize) -> bool {
    let axis = &self.axes[d];
    let h = self.spacing()[d];
    axis
      .windows(2)
      .all(|w| ((w[1] - w[0]) - h).abs() <= 1e-12 * h.abs().max(1.0))
  }

  pub fn node_cart_idx(&self, inode: NodeIdx) -> Vec<usize> {
    linear_index2cartesian_index(inode, &self.npts())
  }
  pub fn node_index(&self, cart_idx: &[usize]) -> NodeIdx {
    cartesian_index2linear_index(cart_idx, &self.npts())
  }
  pub fn node_coords(&self, inode: NodeIdx) -> na::DVector<f64> {
    let cart_idx = self.node_cart_idx(inode);
    na::DVector::from_iterator(
      self.ndim(),
      cart_idx.iter().enumerate().map(|(d, &i)| self.axes[d][i]),
    )
  }

  /// Nodes on the side with the given tag, `None` for unknown tags.
  pub fn boundary_nodes(&self, tag: Tag) -> Option<&[NodeIdx]> {
    self.boundaries.get(&tag).map(|nodes| nodes.as_slice())
  }
  pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
    self.boundaries.keys().copied()
  }
  pub fn is_node_on_boundary(&self, inode: NodeIdx) -> bool {
    let npts = self.npts();
    self
      .node_cart_idx(inode)
      .iter()
      .zip(&npts)
      .any(|(&i, &n)| i == 0 || i == n - 1)
  }

  /// Evaluates `f(x, y)` on every node of a 2D grid, laid out as `[ny][nx]`.
  pub fn map_meshgrid2d(&self, f: impl Fn(f64, f64) -> f64) -> na::DMatrix<f64> {
    assert_eq!(self.ndim(), 2, "meshgrid requires a 2D grid");
    let (xs, ys) = (&self.axes[0], &self.axes[1]);
    na::DMatrix::from_fn(ys.len(), xs.len(), |j, i| f(xs[i], ys[j]))
  }
}
