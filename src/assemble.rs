//! Four-block assembly of the partitioned system matrix.
//!
//! Operators produce entries in full (grid node) numbering,
//! which are then routed into `Auu`, `Auk`, `Aku` or `Akk`
//! depending on the partition of the row and column.

use crate::{
  dofs::{DofMap, EqIdx},
  sparse::{SparseMatrix, Triplet},
};

use rayon::prelude::*;

/// Which rows of the full system to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBlock {
  Unknown,
  Prescribed,
}

impl RowBlock {
  pub fn rows(self, dofs: &DofMap) -> &[EqIdx] {
    match self {
      Self::Unknown => dofs.unknown_to_full(),
      Self::Prescribed => dofs.prescribed_to_full(),
    }
  }
}

/// Assembly algorithm over independent rows.
///
/// Every row is evaluated in parallel into its own triplet buffer.
/// The buffers are concatenated in row order, so the result is deterministic.
pub fn assemble_rows<F>(rows: &[EqIdx], row_entries: F) -> Vec<Triplet>
where
  F: Fn(EqIdx) -> Vec<Triplet> + Sync,
{
  rows
    .par_iter()
    .flat_map_iter(|&irow| row_entries(irow))
    .collect()
}

/// Triplet builders for `Auu`, `Auk`, `Aku` and `Akk`.
///
/// `Aku` and `Akk` are only needed for reactions and are allocated on demand.
#[derive(Debug, Clone)]
pub struct Blocks {
  auu: SparseMatrix,
  auk: SparseMatrix,
  aku: Option<SparseMatrix>,
  akk: Option<SparseMatrix>,
}

impl Blocks {
  pub fn new(dofs: &DofMap) -> Self {
    let (n1, n2) = (dofs.nunknown(), dofs.nprescribed());
    Self {
      auu: SparseMatrix::zeros(n1, n1),
      auk: SparseMatrix::zeros(n1, n2),
      aku: None,
      akk: None,
    }
  }

  /// Resets `Auu` and `Auk` for a fresh pass over the unknown rows.
  pub fn start_unknown_rows(&mut self) {
    self.auu.start();
    self.auk.start();
  }

  /// Allocates (or resets) `Aku` and `Akk` for a pass over the prescribed rows.
  pub fn start_prescribed_rows(&mut self, dofs: &DofMap) {
    let (n1, n2) = (dofs.nunknown(), dofs.nprescribed());
    self
      .aku
      .get_or_insert_with(|| SparseMatrix::zeros(n2, n1))
      .start();
    self
      .akk
      .get_or_insert_with(|| SparseMatrix::zeros(n2, n2))
      .start();
  }

  pub fn has_prescribed_rows(&self) -> bool {
    self.aku.is_some() && self.akk.is_some()
  }

  /// Routes the full system entry `A[i][j] += value` into its block.
  ///
  /// Entries of prescribed rows are dropped while `Aku`/`Akk` are not allocated.
  pub fn put(&mut self, dofs: &DofMap, i: EqIdx, j: EqIdx, value: f64) {
    match (dofs.full_to_unknown(i), dofs.full_to_unknown(j)) {
      (Some(iu), Some(ju)) => self.auu.push(iu, ju, value),
      (Some(iu), None) => {
        let jk = prescribed_index(dofs, j);
        self.auk.push(iu, jk, value);
      }
      (None, ju) => {
        let ik = prescribed_index(dofs, i);
        match ju {
          Some(ju) => {
            if let Some(aku) = &mut self.aku {
              aku.push(ik, ju, value);
            }
          }
          None => {
            if let Some(akk) = &mut self.akk {
              akk.push(ik, prescribed_index(dofs, j), value);
            }
          }
        }
      }
    }
  }

  pub fn put_all(&mut self, dofs: &DofMap, triplets: impl IntoIterator<Item = Triplet>) {
    for (i, j, value) in triplets {
      self.put(dofs, i, j, value);
    }
  }

  pub fn uu(&self) -> &SparseMatrix {
    &self.auu
  }
  pub fn uk(&self) -> &SparseMatrix {
    &self.auk
  }
  pub fn ku(&self) -> Option<&SparseMatrix> {
    self.aku.as_ref()
  }
  pub fn kk(&self) -> Option<&SparseMatrix> {
    self.akk.as_ref()
  }
}

fn prescribed_index(dofs: &DofMap, ieq: EqIdx) -> EqIdx {
  dofs
    .full_to_prescribed(ieq)
    .unwrap_or_else(|| unreachable!("equation {ieq} is in neither partition"))
}

#[cfg(test)]
mod test {
  use super::{assemble_rows, Blocks, RowBlock};
  use crate::{
    dofs::DofMap,
    linalg::{Matrix, Vector},
  };

  /// Full 5x5 matrix with entries `10*(i+1) + (j+1)`.
  fn put_full(blocks: &mut Blocks, dofs: &DofMap) {
    for i in 0..5 {
      for j in 0..5 {
        blocks.put(dofs, i, j, (10 * (i + 1) + (j + 1)) as f64);
      }
    }
  }

  #[test]
  fn routing() {
    let dofs = DofMap::new(5, &[4, 2]).unwrap();
    let mut blocks = Blocks::new(&dofs);
    blocks.start_unknown_rows();
    blocks.start_prescribed_rows(&dofs);
    put_full(&mut blocks, &dofs);

    #[rustfmt::skip]
    let auu = Matrix::from_row_slice(3, 3, &[
      11.0, 12.0, 14.0,
      21.0, 22.0, 24.0,
      41.0, 42.0, 44.0,
    ]);
    #[rustfmt::skip]
    let auk = Matrix::from_row_slice(3, 2, &[
      13.0, 15.0,
      23.0, 25.0,
      43.0, 45.0,
    ]);
    #[rustfmt::skip]
    let aku = Matrix::from_row_slice(2, 3, &[
      31.0, 32.0, 34.0,
      51.0, 52.0, 54.0,
    ]);
    #[rustfmt::skip]
    let akk = Matrix::from_row_slice(2, 2, &[
      33.0, 35.0,
      53.0, 55.0,
    ]);
    assert_eq!(blocks.uu().to_nalgebra_dense(), auu);
    assert_eq!(blocks.uk().to_nalgebra_dense(), auk);
    assert_eq!(blocks.ku().unwrap().to_nalgebra_dense(), aku);
    assert_eq!(blocks.kk().unwrap().to_nalgebra_dense(), akk);

    let bu = Vector::from_vec(vec![100.0, 101.0, 103.0]);
    let bk = Vector::from_vec(vec![102.0, 104.0]);
    let b = dofs.join(&bu, &bk);
    assert_eq!(b.as_slice(), &[100.0, 101.0, 102.0, 103.0, 104.0]);
  }

  #[test]
  fn prescribed_rows_are_lazy() {
    let dofs = DofMap::new(5, &[4, 2]).unwrap();
    let mut blocks = Blocks::new(&dofs);
    put_full(&mut blocks, &dofs);
    assert!(!blocks.has_prescribed_rows());
    assert!(blocks.ku().is_none());
    assert_eq!(blocks.uu().ntriplets(), 9);
    assert_eq!(blocks.uk().ntriplets(), 6);
  }

  #[test]
  fn start_resets() {
    let dofs = DofMap::new(5, &[4, 2]).unwrap();
    let mut blocks = Blocks::new(&dofs);
    put_full(&mut blocks, &dofs);
    put_full(&mut blocks, &dofs);
    assert_eq!(blocks.uu().ntriplets(), 18);
    blocks.start_unknown_rows();
    put_full(&mut blocks, &dofs);
    assert_eq!(blocks.uu().to_nalgebra_dense()[(0, 0)], 11.0);
  }

  #[test]
  fn rows_keep_order() {
    let dofs = DofMap::new(6, &[0, 5]).unwrap();
    let rows = RowBlock::Unknown.rows(&dofs);
    let triplets = assemble_rows(rows, |i| vec![(i, i, 1.0), (i, 0, -1.0)]);
    let expected: Vec<_> = (1..5).flat_map(|i| [(i, i, 1.0), (i, 0, -1.0)]).collect();
    assert_eq!(triplets, expected);
    assert_eq!(RowBlock::Prescribed.rows(&dofs), &[0, 5]);
  }
}
