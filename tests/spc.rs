//! Spectral collocation Laplacian on uniform and Chebyshev-Gauss-Lobatto grids.

extern crate nalgebra as na;

use gridpde::{
  assemble::{Blocks, RowBlock},
  bc::{BcValue, BoundaryConds},
  dofs::DofMap,
  grid::{tag, RectGrid},
  linalg::{assert_mat_eq, kronecker_sum, Matrix},
  operators::{Method, SpcLaplacian},
  params::Params,
  solver::Solver,
  spectral::{LagrangeInterp, NodeDistribution},
};

use approx::assert_relative_eq;
use std::{rc::Rc, sync::LazyLock};

fn unit_params() -> Params {
  Params::from([("kx", 1.0), ("ky", 1.0)])
}

/// `Auu` after homogeneous conditions on the 5x5 CGL grid on `[-1,1]^2`.
#[rustfmt::skip]
static CGL_5X5_AUU: LazyLock<Matrix> = LazyLock::new(|| Matrix::from_row_slice(9, 9, &[
   28.0, -6.0,  2.0, -6.0,  0.0,  0.0,  2.0,  0.0,  0.0,
   -4.0, 20.0, -4.0,  0.0, -6.0,  0.0,  0.0,  2.0,  0.0,
    2.0, -6.0, 28.0,  0.0,  0.0, -6.0,  0.0,  0.0,  2.0,
   -4.0,  0.0,  0.0, 20.0, -6.0,  2.0, -4.0,  0.0,  0.0,
    0.0, -4.0,  0.0, -4.0, 12.0, -4.0,  0.0, -4.0,  0.0,
    0.0,  0.0, -4.0,  2.0, -6.0, 20.0,  0.0,  0.0, -4.0,
    2.0,  0.0,  0.0, -6.0,  0.0,  0.0, 28.0, -6.0,  2.0,
    0.0,  2.0,  0.0,  0.0, -6.0,  0.0, -4.0, 20.0, -4.0,
    0.0,  0.0,  2.0,  0.0,  0.0, -6.0,  2.0, -6.0, 28.0,
]));

#[test]
fn uniform_4x4_with_ramps() {
  let mut solver = Solver::new_grid(
    Method::SpectralCollocation,
    NodeDistribution::Uniform,
    &unit_params(),
    &[0.0, 0.0],
    &[2.0, 2.0],
    &[3, 3],
  )
  .unwrap();

  let mut bcs = BoundaryConds::new_scalar(solver.grid().clone());
  bcs.add(tag::XMIN, "u", 1.0).unwrap();
  bcs.add(tag::XMAX, "u", 2.0).unwrap();
  bcs.add(tag::YMIN, "u", 1.0).unwrap();
  bcs.add(tag::YMAX, "u", 2.0).unwrap();
  solver.set_boundary_conditions(bcs).unwrap();
  solver.assemble().unwrap();

  #[rustfmt::skip]
  let expected_auu = Matrix::from_row_slice(4, 4, &[
     9.00, -2.25, -2.25,  0.00,
    -2.25,  9.00,  0.00, -2.25,
    -2.25,  0.00,  9.00, -2.25,
     0.00, -2.25, -2.25,  9.00,
  ]);
  let auu = solver.blocks().unwrap().uu().to_nalgebra_dense();
  assert_mat_eq(&auu, &expected_auu, 1e-12);

  solver.solve(0.0, false).unwrap();
  #[rustfmt::skip]
  let expected_u = [
    1.0, 1.0,  1.0,  1.0,
    1.0, 1.25, 1.5,  2.0,
    1.0, 1.5,  1.75, 2.0,
    2.0, 2.0,  2.0,  2.0,
  ];
  let u = solver.u().unwrap();
  for (i, &expected) in expected_u.iter().enumerate() {
    assert_relative_eq!(u[i], expected, epsilon = 1e-12);
  }
}

#[test]
fn cgl_5x5_homogeneous() {
  let mut solver = Solver::new_grid(
    Method::SpectralCollocation,
    NodeDistribution::ChebyshevGaussLobatto,
    &unit_params(),
    &[-1.0, -1.0],
    &[1.0, 1.0],
    &[4, 4],
  )
  .unwrap();
  let mut bcs = BoundaryConds::new_scalar(solver.grid().clone());
  bcs.set_homogeneous("u").unwrap();
  solver.set_boundary_conditions(bcs).unwrap();
  solver.assemble().unwrap();

  let auu = solver.blocks().unwrap().uu().to_nalgebra_dense();
  assert_mat_eq(&auu, &CGL_5X5_AUU, 1e-10);

  solver.solve(0.0, false).unwrap();
  assert!(solver.u().unwrap().amax() < 1e-14);
}

#[test]
fn full_operator_is_kronecker_sum() {
  let kind = NodeDistribution::ChebyshevGaussLobatto;
  let lipx = LagrangeInterp::new(3, kind).unwrap().mapped(0.0, 2.0).unwrap();
  let lipy = LagrangeInterp::new(4, kind).unwrap().mapped(-1.0, 3.0).unwrap();

  let solver = Solver::new_grid(
    Method::SpectralCollocation,
    kind,
    &unit_params(),
    &[0.0, -1.0],
    &[2.0, 3.0],
    &[3, 4],
  )
  .unwrap();
  let grid = solver.grid();
  assert_eq!(grid.npts(), vec![4, 5]);

  let dofs = DofMap::new(grid.nnodes(), &[]).unwrap();
  let mut blocks = Blocks::new(&dofs);
  blocks.start_unknown_rows();
  let triplets = solver
    .operator()
    .assemble(grid, &dofs, RowBlock::Unknown)
    .unwrap();
  blocks.put_all(&dofs, triplets);

  let expected = -kronecker_sum(&[lipy.d2().clone(), lipx.d2().clone()]);
  assert_mat_eq(&blocks.uu().to_nalgebra_dense(), &expected, 1e-10);
}

/// `u = x^2 + y^2` solves `-Lapl u = -4` and is reproduced exactly.
#[test]
fn cgl_manufactured_quadratic() {
  let lips: Vec<_> = (0..2)
    .map(|_| LagrangeInterp::new(6, NodeDistribution::ChebyshevGaussLobatto).unwrap())
    .collect();
  let grid = Rc::new(RectGrid::from_axes(lips.iter().map(|l| l.nodes().to_vec()).collect()).unwrap());
  let op = SpcLaplacian::from_interpolators(&unit_params(), &lips)
    .unwrap()
    .with_source(|_, _| -4.0);
  let mut solver = Solver::new(grid.clone(), op);

  let exact = |x: &na::DVector<f64>| x[0] * x[0] + x[1] * x[1];
  let mut bcs = BoundaryConds::new_scalar(grid.clone());
  for t in [tag::XMIN, tag::XMAX, tag::YMIN, tag::YMAX] {
    bcs.add(t, "u", BcValue::function(move |x, _| exact(x))).unwrap();
  }
  solver.set_boundary_conditions(bcs).unwrap();
  solver.assemble().unwrap();
  solver.solve(0.0, false).unwrap();

  let u = solver.u().unwrap();
  for inode in 0..grid.nnodes() {
    assert_relative_eq!(u[inode], exact(&grid.node_coords(inode)), epsilon = 1e-10);
  }
}
