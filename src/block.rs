use std::{fmt, ptr::NonNull};

/// Descriptor of one busy region of the arena, as the half-open byte range
/// `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub start: usize,
  pub end: usize,
  pub tag: u64,
}

impl Block {
  pub fn new(
    start: usize,
    end: usize,
    tag: u64,
  ) -> Self {
    debug_assert!(start < end, "empty block {start:#x}..{end:#x}");
    Self { start, end, tag }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn overlaps(
    &self,
    other: &Block,
  ) -> bool {
    self.start < other.end && other.start < self.end
  }
}

/// Handle returned by [`Heap::allocate`](crate::Heap::allocate) and
/// [`Heap::resize`](crate::Heap::resize).
///
/// Besides the pointer into the arena, a handle remembers which allocation it
/// came from. Once the block it names is released, the handle goes stale: a
/// later allocation that lands on the same address hands out a new handle, and
/// the stale one no longer matches it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
  ptr: NonNull<u8>,
  tag: u64,
}

impl Address {
  pub(crate) fn new(
    ptr: NonNull<u8>,
    tag: u64,
  ) -> Self {
    Self { ptr, tag }
  }

  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr.as_ptr()
  }

  pub fn as_non_null(&self) -> NonNull<u8> {
    self.ptr
  }

  pub fn addr(&self) -> usize {
    self.ptr.as_ptr() as usize
  }

  pub(crate) fn tag(&self) -> u64 {
    self.tag
  }
}

impl fmt::Debug for Address {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:p}#{}", self.ptr, self.tag)
  }
}

// The handle only names a region; access to the bytes behind it is governed by
// the unsafe pointer API.
unsafe impl Send for Address {}
unsafe impl Sync for Address {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_len_and_overlap() {
    let a = Block::new(0x1000, 0x1080, 1);
    let b = Block::new(0x1080, 0x1100, 2);
    let c = Block::new(0x1040, 0x10c0, 3);

    assert_eq!(a.len(), 0x80);
    assert!(!a.is_empty());

    // Adjacent blocks share a boundary but do not overlap.
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));

    assert!(a.overlaps(&c));
    assert!(c.overlaps(&b));
  }

  #[test]
  fn test_address_debug() {
    let mut byte = 0u8;
    let ptr = NonNull::from(&mut byte);
    let address = Address::new(ptr, 7);

    assert_eq!(address.as_ptr(), ptr.as_ptr());
    assert_eq!(address.addr(), ptr.as_ptr() as usize);
    assert!(format!("{address:?}").ends_with("#7"));
  }
}
