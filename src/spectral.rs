//! Lagrange interpolation and spectral differentiation matrices.
//!
//! The differentiation matrix uses the barycentric weights
//! $w_j = 1 / prod_(k != j) (x_j - x_k)$:
//! $D_(i j) = (w_j / w_i) / (x_i - x_j)$ for $i != j$ and
//! $D_(i i) = - sum_(j != i) D_(i j)$.
//! The second derivative matrix is $D^2 = D D$.

use crate::{error::ConfigError, linalg::Matrix};

use std::{f64::consts::PI, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDistribution {
  Uniform,
  ChebyshevGaussLobatto,
}

impl FromStr for NodeDistribution {
  type Err = ConfigError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "uni" => Ok(Self::Uniform),
      "cgl" => Ok(Self::ChebyshevGaussLobatto),
      _ => Err(ConfigError::UnknownNodeDistribution(s.to_string())),
    }
  }
}

impl NodeDistribution {
  /// `degree + 1` ascending nodes on `[-1, 1]`.
  pub fn nodes(self, degree: usize) -> Vec<f64> {
    let n = degree as f64;
    (0..=degree)
      .map(|j| {
        // pin the end points, cos(pi) is not exactly -1 in floating point
        if j == 0 {
          return -1.0;
        }
        if j == degree {
          return 1.0;
        }
        let j = j as f64;
        match self {
          Self::Uniform => -1.0 + 2.0 * j / n,
          Self::ChebyshevGaussLobatto => -(PI * j / n).cos(),
        }
      })
      .collect()
  }
}

#[derive(Debug, Clone)]
pub struct LagrangeInterp {
  nodes: Vec<f64>,
  weights: Vec<f64>,
  d1: Matrix,
  d2: Matrix,
}

// constructors
impl LagrangeInterp {
  /// Interpolator of the given degree on `[-1, 1]`.
  pub fn new(degree: usize, kind: NodeDistribution) -> Result<Self, ConfigError> {
    Self::from_nodes(kind.nodes(degree))
  }

  pub fn from_nodes(nodes: Vec<f64>) -> Result<Self, ConfigError> {
    if nodes.len() < 2 {
      return Err(ConfigError::InvalidGrid(format!(
        "interpolation needs at least two nodes, got {}",
        nodes.len()
      )));
    }
    if nodes.windows(2).any(|w| w[0] >= w[1]) {
      return Err(ConfigError::InvalidGrid(
        "interpolation nodes must be strictly increasing".to_string(),
      ));
    }

    let n = nodes.len();
    let weights: Vec<f64> = (0..n)
      .map(|j| {
        let prod: f64 = (0..n)
          .filter(|&k| k != j)
          .map(|k| nodes[j] - nodes[k])
          .product();
        1.0 / prod
      })
      .collect();

    let mut d1 = Matrix::zeros(n, n);
    for i in 0..n {
      let mut diag = 0.0;
      for j in (0..n).filter(|&j| j != i) {
        let dij = (weights[j] / weights[i]) / (nodes[i] - nodes[j]);
        d1[(i, j)] = dij;
        diag -= dij;
      }
      d1[(i, i)] = diag;
    }
    let d2 = &d1 * &d1;

    Ok(Self {
      nodes,
      weights,
      d1,
      d2,
    })
  }

  /// Same interpolator with the nodes affinely mapped onto `[min, max]`.
  pub fn mapped(&self, min: f64, max: f64) -> Result<Self, ConfigError> {
    let (a, b) = (self.nodes[0], self.nodes[self.nodes.len() - 1]);
    let scale = (max - min) / (b - a);
    let nodes = self.nodes.iter().map(|&x| min + (x - a) * scale).collect();
    Self::from_nodes(nodes)
  }
}

// getters
impl LagrangeInterp {
  pub fn degree(&self) -> usize {
    self.nodes.len() - 1
  }
  pub fn nodes(&self) -> &[f64] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
  pub fn d1(&self) -> &Matrix {
    &self.d1
  }
  pub fn d2(&self) -> &Matrix {
    &self.d2
  }
}

impl LagrangeInterp {
  /// Cardinal polynomial `l_i` evaluated at `x`.
  pub fn cardinal(&self, i: usize, x: f64) -> f64 {
    self
      .nodes
      .iter()
      .enumerate()
      .filter(|&(k, _)| k != i)
      .map(|(_, &xk)| (x - xk) / (self.nodes[i] - xk))
      .product()
  }

  /// Barycentric evaluation of the interpolant through `values`.
  pub fn eval(&self, values: &[f64], x: f64) -> f64 {
    assert_eq!(values.len(), self.nodes.len());
    let mut num = 0.0;
    let mut den = 0.0;
    for ((&xj, &wj), &fj) in self.nodes.iter().zip(&self.weights).zip(values) {
      let dx = x - xj;
      if dx == 0.0 {
        return fj;
      }
      let t = wj / dx;
      num += t * fj;
      den += t;
    }
    num / den
  }
}
