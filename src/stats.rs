use std::fmt;

/// Point-in-time view of a heap, taken under its shared lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  pub capacity: usize,
  pub used: usize,
  pub blocks: usize,
  /// Size of the biggest request that would currently succeed.
  pub largest_gap: usize,
  pub directory_slots: usize,
}

impl HeapStats {
  pub fn free(&self) -> usize {
    self.capacity - self.used
  }

  /// Share of free bytes that sit outside the largest gap, from 0.0 to 1.0.
  pub fn fragmentation(&self) -> f64 {
    match self.free() {
      0 => 0.0,
      free => 1.0 - self.largest_gap as f64 / free as f64,
    }
  }
}

impl fmt::Display for HeapStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} of {} bytes used in {} blocks, largest gap = {}, directory slots = {}",
      self.used, self.capacity, self.blocks, self.largest_gap, self.directory_slots
    )
  }
}
