use std::ptr::{self, NonNull};

use libc::{c_void, free, posix_memalign};
use log::debug;

use crate::{
  config::HeapConfig,
  error::{Error, Result},
};

/// The contiguous byte range `[base, base + capacity)` handed out by the heap.
///
/// The memory comes straight from the C allocator, zero-filled, and is aligned
/// to [`HeapConfig::MAX_ALIGNMENT`].
pub struct Arena {
  base: NonNull<u8>,
  capacity: usize,
}

// The arena is plain bytes; every access goes through the heap's lock.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Arena {
  pub fn new(capacity: usize) -> Result<Self> {
    let mut raw: *mut c_void = ptr::null_mut();

    // A zero-sized request may legitimately come back as null, so always ask
    // for at least one byte.
    let status = unsafe { posix_memalign(&mut raw, HeapConfig::MAX_ALIGNMENT, capacity.max(1)) };

    let base = match NonNull::new(raw as *mut u8) {
      Some(base) if status == 0 => base,
      _ => return Err(Error::ArenaUnavailable { capacity }),
    };

    unsafe { ptr::write_bytes(base.as_ptr(), 0, capacity) };

    debug!("arena of {} bytes at {:p}", capacity, base);

    Ok(Self { base, capacity })
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn start(&self) -> usize {
    self.base.as_ptr() as usize
  }

  pub fn end(&self) -> usize {
    self.start() + self.capacity
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn contains(
    &self,
    address: usize,
  ) -> bool {
    (self.start()..self.end()).contains(&address)
  }

  /// Pointer to the arena byte at absolute address `address`.
  pub fn pointer(
    &self,
    address: usize,
  ) -> NonNull<u8> {
    debug_assert!(address >= self.start() && address <= self.end());
    unsafe { self.base.add(address - self.start()) }
  }

  /// Copies `len` bytes between two disjoint regions of the arena.
  ///
  /// # Safety
  ///
  /// Both `[from, from + len)` and `[to, to + len)` must lie inside the arena
  /// and must not overlap, and no other thread may access either range for
  /// the duration of the call.
  pub unsafe fn copy(
    &self,
    from: usize,
    to: usize,
    len: usize,
  ) {
    debug_assert!(from + len <= self.end() && to + len <= self.end());
    unsafe {
      ptr::copy_nonoverlapping(
        self.pointer(from).as_ptr(),
        self.pointer(to).as_ptr(),
        len,
      )
    };
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    debug!("releasing arena of {} bytes at {:p}", self.capacity, self.base);
    unsafe { free(self.base.as_ptr() as *mut c_void) };
  }
}
