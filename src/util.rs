use itertools::Itertools;

/// Sorted copy of `indices` without duplicates.
pub fn sorted_unique(indices: &[usize]) -> Vec<usize> {
  indices.iter().copied().sorted_unstable().dedup().collect()
}

/// Number of decimal digits needed to print every index below `n`.
pub fn ndigits(n: usize) -> usize {
  let mut max = n.saturating_sub(1);
  let mut digits = 1;
  while max >= 10 {
    max /= 10;
    digits += 1;
  }
  digits
}
