//! Partitioning of the equations of a linear system `A x = b` into
//! equations with unknown `x` values and equations with prescribed `x` values.
//!
//! The full system is split into four blocks
//!
//! ```text
//!   [ Auu Auk ] { xu }   { bu }     u: unknown x, given b
//!   [ Aku Akk ] { xk } = { bk }     k: prescribed x, b recovered afterwards
//! ```
//!
//! Example with `N = 9` and prescribed equations `[0, 3, 6]`:
//!
//! ```text
//!   unknown_to_full    = [1 2 4 5 7 8]
//!   full_to_unknown    = [- 0 1 - 2 3 - 4 5]
//!   prescribed_to_full = [0 3 6]
//!   full_to_prescribed = [0 - - 1 - - 2 - -]
//! ```

use crate::{error::InvariantError, linalg::Vector, util};

use std::fmt;

pub type EqIdx = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofMap {
  unknown_to_full: Vec<EqIdx>,
  full_to_unknown: Vec<Option<EqIdx>>,
  prescribed_to_full: Vec<EqIdx>,
  full_to_prescribed: Vec<Option<EqIdx>>,
}

impl DofMap {
  /// Prescribed indices may be unsorted and contain duplicates.
  pub fn new(n: usize, prescribed: &[EqIdx]) -> Result<Self, InvariantError> {
    if let Some(&index) = prescribed.iter().find(|&&i| i >= n) {
      return Err(InvariantError::IndexOutOfBounds { index, n });
    }
    let prescribed = util::sorted_unique(prescribed);

    let nprescribed = prescribed.len();
    let mut unknown_to_full = Vec::with_capacity(n - nprescribed);
    let mut full_to_unknown = vec![None; n];
    let mut prescribed_to_full = Vec::with_capacity(nprescribed);
    let mut full_to_prescribed = vec![None; n];

    for ieq in 0..n {
      if prescribed.binary_search(&ieq).is_ok() {
        full_to_prescribed[ieq] = Some(prescribed_to_full.len());
        prescribed_to_full.push(ieq);
      } else {
        full_to_unknown[ieq] = Some(unknown_to_full.len());
        unknown_to_full.push(ieq);
      }
    }

    Ok(Self {
      unknown_to_full,
      full_to_unknown,
      prescribed_to_full,
      full_to_prescribed,
    })
  }

  /// Total number of equations.
  pub fn n(&self) -> usize {
    self.full_to_unknown.len()
  }
  pub fn nunknown(&self) -> usize {
    self.unknown_to_full.len()
  }
  pub fn nprescribed(&self) -> usize {
    self.prescribed_to_full.len()
  }

  pub fn unknown_to_full(&self) -> &[EqIdx] {
    &self.unknown_to_full
  }
  pub fn prescribed_to_full(&self) -> &[EqIdx] {
    &self.prescribed_to_full
  }
  pub fn full_to_unknown(&self, ieq: EqIdx) -> Option<EqIdx> {
    self.full_to_unknown[ieq]
  }
  pub fn full_to_prescribed(&self, ieq: EqIdx) -> Option<EqIdx> {
    self.full_to_prescribed[ieq]
  }
  pub fn is_prescribed(&self, ieq: EqIdx) -> bool {
    self.full_to_prescribed[ieq].is_some()
  }

  /// Joins the unknown and prescribed parts into a full vector.
  pub fn join(&self, xu: &Vector, xk: &Vector) -> Vector {
    let mut full = Vector::zeros(self.n());
    self.join_into(&mut full, xu, xk);
    full
  }

  pub fn join_into(&self, full: &mut Vector, xu: &Vector, xk: &Vector) {
    assert_eq!(full.len(), self.n());
    assert_eq!(xu.len(), self.nunknown());
    assert_eq!(xk.len(), self.nprescribed());
    for (iu, &ieq) in self.unknown_to_full.iter().enumerate() {
      full[ieq] = xu[iu];
    }
    for (ik, &ieq) in self.prescribed_to_full.iter().enumerate() {
      full[ieq] = xk[ik];
    }
  }

  /// Splits a full vector into its unknown and prescribed parts.
  pub fn split(&self, full: &Vector) -> (Vector, Vector) {
    assert_eq!(full.len(), self.n());
    let xu = Vector::from_iterator(
      self.nunknown(),
      self.unknown_to_full.iter().map(|&ieq| full[ieq]),
    );
    let xk = Vector::from_iterator(
      self.nprescribed(),
      self.prescribed_to_full.iter().map(|&ieq| full[ieq]),
    );
    (xu, xk)
  }
}

impl fmt::Display for DofMap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fmt_map = |map: &[Option<EqIdx>]| {
      map
        .iter()
        .map(|i| i.map_or("-".to_string(), |i| i.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
    };
    writeln!(f, "number of unknown equations:    N1 = {}", self.nunknown())?;
    writeln!(f, "number of prescribed equations: N2 = {}", self.nprescribed())?;
    writeln!(f, "total number of equations:      N  = {}", self.n())?;
    writeln!(f, "unknown_to_full    = {:?}", self.unknown_to_full)?;
    writeln!(f, "full_to_unknown    = [{}]", fmt_map(&self.full_to_unknown))?;
    writeln!(f, "prescribed_to_full = {:?}", self.prescribed_to_full)?;
    write!(f, "full_to_prescribed = [{}]", fmt_map(&self.full_to_prescribed))
  }
}
