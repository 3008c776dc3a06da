use crate::error::NumericalError;

use faer::linalg::solvers::Solve;

pub type Vector = na::DVector<f64>;
pub type Matrix = na::DMatrix<f64>;
pub type CsrMatrix = nas::CsrMatrix<f64>;

type SparseMatrixFaer = faer::sparse::SparseRowMat<usize, f64>;

pub fn nalgebra2faer(m: CsrMatrix) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (row_offsets, col_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseRowMat::new_checked(nrows, ncols, row_offsets, None, col_indices);
  faer::sparse::SparseRowMat::new(symbolic, values)
}

/// Factorization used by [`SparseDirectSolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinSolKind {
  /// General sparse LU. Required for the mirrored FDM stencil and for
  /// spectral collocation, which are both non-symmetric.
  #[default]
  Lu,
  /// Sparse Cholesky, reading the upper triangle. Symmetric positive definite only.
  Cholesky,
}

enum Factorization {
  Lu(faer::sparse::linalg::solvers::Lu<usize, f64>),
  Cholesky(faer::sparse::linalg::solvers::Llt<usize, f64>),
}

/// Largest accepted `|A x - b| / |b|` of a solution.
pub const RESIDUAL_TOL: f64 = 1e-8;

/// Factorize once, solve many times.
///
/// Solutions whose residual against the original matrix exceeds
/// [`RESIDUAL_TOL`] are rejected.
pub struct SparseDirectSolver {
  kind: LinSolKind,
  a: CsrMatrix,
  raw: Factorization,
}

impl SparseDirectSolver {
  pub fn factorize(a: CsrMatrix, kind: LinSolKind) -> Result<Self, NumericalError> {
    if a.nrows() != a.ncols() {
      return Err(NumericalError::Factorization(format!(
        "matrix is not square ({}x{})",
        a.nrows(),
        a.ncols()
      )));
    }
    let a_faer = nalgebra2faer(a.clone());
    let raw = match kind {
      LinSolKind::Lu => a_faer
        .sp_lu()
        .map(Factorization::Lu)
        .map_err(|err| NumericalError::Factorization(format!("{err:?}")))?,
      LinSolKind::Cholesky => a_faer
        .sp_cholesky(faer::Side::Upper)
        .map(Factorization::Cholesky)
        .map_err(|err| NumericalError::Factorization(format!("{err:?}")))?,
    };
    Ok(Self { kind, a, raw })
  }

  pub fn kind(&self) -> LinSolKind {
    self.kind
  }
  pub fn nrows(&self) -> usize {
    self.a.nrows()
  }

  pub fn solve(&self, rhs: &Vector) -> Result<Vector, NumericalError> {
    assert_eq!(rhs.nrows(), self.nrows(), "rhs length must match the system size");
    let b = faer::Col::from_fn(rhs.nrows(), |i| rhs[i]);
    let x = match &self.raw {
      Factorization::Lu(lu) => lu.solve(b),
      Factorization::Cholesky(llt) => llt.solve(b),
    };
    let x = Vector::from_iterator(x.nrows(), x.iter().copied());
    if !x.iter().all(|v| v.is_finite()) {
      return Err(NumericalError::NonFiniteSolution);
    }

    let residual = (&self.a * &x - rhs).norm();
    let rhs_norm = rhs.norm();
    if residual > RESIDUAL_TOL * rhs_norm {
      return Err(NumericalError::LargeResidual {
        relative: residual / rhs_norm,
      });
    }
    Ok(x)
  }
}

pub fn kronecker_sum(mats: &[Matrix]) -> Matrix {
  assert!(!mats.is_empty());
  assert!(mats.iter().all(|m| m.nrows() == m.ncols()));

  let eyes: Vec<_> = mats
    .iter()
    .map(|m| Matrix::identity(m.nrows(), m.nrows()))
    .collect();

  let kron_size = mats.iter().map(|mat| mat.nrows()).product::<usize>();
  let mut kron_sum = Matrix::zeros(kron_size, kron_size);
  for (dim, mat) in mats.iter().enumerate() {
    let eyes_before = eyes[..dim]
      .iter()
      .fold(Matrix::identity(1, 1), |prod, eye| prod.kronecker(eye));
    let eyes_after = eyes[dim + 1..]
      .iter()
      .fold(Matrix::identity(1, 1), |prod, eye| prod.kronecker(eye));

    let kron_prod = eyes_before.kronecker(mat).kronecker(&eyes_after);
    kron_sum += kron_prod;
  }

  kron_sum
}

pub fn assert_mat_eq(a: &Matrix, b: &Matrix, tol: f64) {
  assert_eq!(a.shape(), b.shape(), "matrix shapes differ");
  let diff = a - b;
  let error = diff.amax();
  if error > tol {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal (max abs diff {error:e}).");
  }
}
