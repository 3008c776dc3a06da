//! Finite difference Laplacian assembly on small grids,
//! compared against hand checked matrices.
//!
//! The grids have unit spacing (or spacing 1/2), so the matrices are
//! integer multiples of the graph Laplacian with mirrored boundary rows.

extern crate nalgebra as na;

use gridpde::{
  assemble::{Blocks, RowBlock},
  dofs::DofMap,
  grid::RectGrid,
  linalg::{assert_mat_eq, kronecker_sum, Matrix},
  operators::Operator,
  params::Params,
};

use std::sync::LazyLock;

fn unit_params() -> Params {
  Params::from([("kx", 1.0), ("ky", 1.0), ("kz", 1.0)])
}

/// Dense `Auu` and `Auk` of the operator.
fn assemble_dense(op: &Operator, grid: &RectGrid, dofs: &DofMap) -> (Matrix, Matrix) {
  let mut blocks = Blocks::new(dofs);
  blocks.start_unknown_rows();
  let triplets = op.assemble(grid, dofs, RowBlock::Unknown).unwrap();
  blocks.put_all(dofs, triplets);
  (
    blocks.uu().to_nalgebra_dense(),
    blocks.uk().to_nalgebra_dense(),
  )
}

/// Mirrored 1D Laplacian with unit spacing.
fn laplacian_1d_mirrored(n: usize) -> Matrix {
  let mut lapl = Matrix::zeros(n, n);
  for i in 0..n {
    lapl[(i, i)] = 2.0;
    let left = if i == 0 { 1 } else { i - 1 };
    let right = if i == n - 1 { n - 2 } else { i + 1 };
    lapl[(i, left)] -= 1.0;
    lapl[(i, right)] -= 1.0;
  }
  lapl
}

/// Full 3x3 matrix on `[0,2]^2`, no prescribed nodes.
#[rustfmt::skip]
static FULL_3X3: LazyLock<Matrix> = LazyLock::new(|| Matrix::from_row_slice(9, 9, &[
   4.0,-2.0, 0.0,-2.0, 0.0, 0.0, 0.0, 0.0, 0.0,
  -1.0, 4.0,-1.0, 0.0,-2.0, 0.0, 0.0, 0.0, 0.0,
   0.0,-2.0, 4.0, 0.0, 0.0,-2.0, 0.0, 0.0, 0.0,
  -1.0, 0.0, 0.0, 4.0,-2.0, 0.0,-1.0, 0.0, 0.0,
   0.0,-1.0, 0.0,-1.0, 4.0,-1.0, 0.0,-1.0, 0.0,
   0.0, 0.0,-1.0, 0.0,-2.0, 4.0, 0.0, 0.0,-1.0,
   0.0, 0.0, 0.0,-2.0, 0.0, 0.0, 4.0,-2.0, 0.0,
   0.0, 0.0, 0.0, 0.0,-2.0, 0.0,-1.0, 4.0,-1.0,
   0.0, 0.0, 0.0, 0.0, 0.0,-2.0, 0.0,-2.0, 4.0,
]));

#[test]
fn full_matrix_3x3() {
  let grid = RectGrid::new_uniform(&[0.0, 0.0], &[2.0, 2.0], &[2, 2]).unwrap();
  let dofs = DofMap::new(grid.nnodes(), &[]).unwrap();
  let op = Operator::fdm(&unit_params()).unwrap();
  let (auu, auk) = assemble_dense(&op, &grid, &dofs);
  assert_mat_eq(&auu, &FULL_3X3, 0.0);
  assert_eq!(auk.shape(), (9, 0));
}

#[test]
fn left_column_prescribed() {
  let grid = RectGrid::new_uniform(&[0.0, 0.0], &[1.0, 1.0], &[2, 2]).unwrap();
  let dofs = DofMap::new(grid.nnodes(), &[0, 3, 6]).unwrap();
  let op = Operator::fdm(&unit_params()).unwrap();
  let (auu, auk) = assemble_dense(&op, &grid, &dofs);

  assert_eq!(auu.shape(), (6, 6));
  assert_eq!(auk.shape(), (6, 3));
  assert_eq!(
    auu.row(0).iter().copied().collect::<Vec<_>>(),
    vec![16.0, -4.0, -8.0, 0.0, 0.0, 0.0]
  );
  assert_eq!(
    auk.row(0).iter().copied().collect::<Vec<_>>(),
    vec![-4.0, 0.0, 0.0]
  );
}

#[test]
fn interior_of_4x4() {
  let grid = RectGrid::new_uniform(&[0.0, 0.0], &[3.0, 3.0], &[3, 3]).unwrap();
  let boundary: Vec<_> = (0..16).filter(|&n| grid.is_node_on_boundary(n)).collect();
  let dofs = DofMap::new(grid.nnodes(), &boundary).unwrap();
  assert_eq!(dofs.unknown_to_full(), &[5, 6, 9, 10]);

  let op = Operator::fdm(&unit_params()).unwrap();
  let (auu, auk) = assemble_dense(&op, &grid, &dofs);
  #[rustfmt::skip]
  let expected = Matrix::from_row_slice(4, 4, &[
     4.0,-1.0,-1.0, 0.0,
    -1.0, 4.0, 0.0,-1.0,
    -1.0, 0.0, 4.0,-1.0,
     0.0,-1.0,-1.0, 4.0,
  ]);
  assert_mat_eq(&auu, &expected, 0.0);
  // every interior node touches exactly two boundary nodes
  for i in 0..4 {
    assert_eq!(auk.row(i).sum(), -2.0);
  }
}

#[test]
fn separable_structure() {
  for (nx, ny) in [(2, 2), (3, 4), (5, 3)] {
    let grid = RectGrid::new_uniform(
      &[0.0, 0.0],
      &[(nx - 1) as f64, (ny - 1) as f64],
      &[nx - 1, ny - 1],
    )
    .unwrap();
    let dofs = DofMap::new(grid.nnodes(), &[]).unwrap();
    let op = Operator::fdm(&unit_params()).unwrap();
    let (auu, _) = assemble_dense(&op, &grid, &dofs);

    let expected = kronecker_sum(&[laplacian_1d_mirrored(ny), laplacian_1d_mirrored(nx)]);
    assert_mat_eq(&auu, &expected, 1e-14);
  }
}

#[test]
fn rows_sum_to_zero() {
  let grid = RectGrid::new_uniform(&[0.0; 3], &[1.0, 2.0, 3.0], &[2, 3, 4]).unwrap();
  let dofs = DofMap::new(grid.nnodes(), &[]).unwrap();
  let op = Operator::fdm(&Params::from([("kx", 1.0), ("ky", 2.0), ("kz", 0.5)])).unwrap();
  let (auu, _) = assemble_dense(&op, &grid, &dofs);
  let ones = na::DVector::from_element(grid.nnodes(), 1.0);
  assert!((auu * ones).amax() < 1e-12);
}
