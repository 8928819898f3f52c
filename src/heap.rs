use std::{cmp, ptr::NonNull};

use log::{debug, trace, warn};
use parking_lot::RwLock;

use crate::{
  align_to,
  arena::Arena,
  block::{Address, Block},
  config::HeapConfig,
  directory::{BlockDirectory, BlockRef},
  error::{Error, Result},
  stats::HeapStats,
};

/// First-fit heap over a single fixed arena.
///
/// Every public method takes the internal lock exactly once: mutations hold it
/// exclusively, lookups share it. The work itself is done by `HeapState`,
/// which never touches the lock, so operations built from other operations
/// (a moving resize allocates and frees) run entirely inside the one
/// exclusive section of their caller.
pub struct Heap {
  state: RwLock<HeapState>,
  capacity: usize,
}

impl Heap {
  /// Creates a heap managing `capacity` bytes with the default configuration.
  pub fn init(capacity: usize) -> Result<Self> {
    Self::with_config(HeapConfig::new(capacity))
  }

  pub fn with_config(config: HeapConfig) -> Result<Self> {
    config.validate()?;

    let state = HeapState {
      arena: Arena::new(config.capacity)?,
      directory: BlockDirectory::with_capacity(config.directory_capacity)?,
      alignment: config.alignment,
      next_tag: 1,
    };

    debug!(
      "heap ready: {} bytes, alignment {}, {} directory slots",
      config.capacity, config.alignment, config.directory_capacity
    );

    Ok(Self {
      state: RwLock::new(state),
      capacity: config.capacity,
    })
  }

  /// Releases the arena and the directory. Handles still held by callers
  /// dangle afterwards.
  pub fn deinit(self) {
    let state = self.state.into_inner();
    debug!(
      "heap shut down with {} live blocks ({} bytes)",
      state.directory.len(),
      state.used()
    );
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn base(&self) -> NonNull<u8> {
    self.state.read().arena.base()
  }

  /// Reserves `size` bytes at the lowest address where they fit.
  ///
  /// A zero-sized request always succeeds with the arena base and reserves
  /// nothing.
  pub fn allocate(
    &self,
    size: usize,
  ) -> Result<Address> {
    self.state.write().allocate(size)
  }

  /// Releases the block behind `address`. `None`, stale and foreign handles
  /// are ignored.
  pub fn free<A: Into<Option<Address>>>(
    &self,
    address: A,
  ) {
    if let Some(address) = address.into() {
      self.state.write().free(address);
    }
  }

  /// Changes the size of the block behind `address`.
  ///
  /// - `None` allocates `new_size` bytes.
  /// - `new_size == 0` frees the block and returns `Ok(None)`.
  /// - The block grows or shrinks in place when the gap after it is wide
  ///   enough, and the same handle comes back.
  /// - Otherwise the contents move to a new block and the old one is freed.
  ///   If no new block can be found the original is left as it was.
  ///
  /// A handle that names no live block is left alone and yields `Ok(None)`.
  ///
  /// # Safety
  ///
  /// No other thread may read or write the block while the call runs, and
  /// when the block moves the old handle must not be used again.
  pub unsafe fn resize<A: Into<Option<Address>>>(
    &self,
    address: A,
    new_size: usize,
  ) -> Result<Option<Address>> {
    unsafe { self.state.write().resize(address.into(), new_size) }
  }

  /// Whether `address` names a live block.
  pub fn contains(
    &self,
    address: Address,
  ) -> bool {
    self.state.read().lookup(address).is_some()
  }

  /// Size in bytes of the block behind `address`.
  pub fn block_size(
    &self,
    address: Address,
  ) -> Option<usize> {
    let state = self.state.read();
    let block = state.lookup(address)?;
    state.directory.get(block).map(Block::len)
  }

  /// Busy blocks in address order.
  pub fn blocks(&self) -> Vec<Block> {
    self.with_directory(|directory| directory.iter().copied().collect())
  }

  /// Runs `inspect` against the block directory under the shared lock.
  pub fn with_directory<R>(
    &self,
    inspect: impl FnOnce(&BlockDirectory) -> R,
  ) -> R {
    inspect(&self.state.read().directory)
  }

  pub fn stats(&self) -> HeapStats {
    let state = self.state.read();

    HeapStats {
      capacity: self.capacity,
      used: state.used(),
      blocks: state.directory.len(),
      largest_gap: state.gaps().max().unwrap_or(0),
      directory_slots: state.directory.capacity(),
    }
  }

  /// Squeezes empty slots out of the directory without changing its size.
  pub fn compact_directory(&self) {
    self.state.write().directory.compact();
  }

  /// Resizes the directory to `slots` descriptors. Fails when fewer slots
  /// than live blocks are requested.
  pub fn shrink_directory(
    &self,
    slots: usize,
  ) -> Result<()> {
    self.state.write().directory.resize_capacity(slots)
  }
}

struct HeapState {
  arena: Arena,
  directory: BlockDirectory,
  alignment: usize,
  next_tag: u64,
}

impl HeapState {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Address> {
    if size == 0 {
      return Ok(Address::new(self.arena.base(), 0));
    }

    if size > self.arena.capacity() {
      trace!("allocate({}) -> exceeds capacity", size);
      return Err(Error::CapacityExceeded {
        requested: size,
        capacity: self.arena.capacity(),
      });
    }

    let size = align_to!(size, self.alignment);
    let Some(start) = self.first_fit(size) else {
      trace!("allocate({}) -> no gap", size);
      return Err(Error::OutOfMemory { requested: size });
    };

    let tag = self.next_tag;
    self.directory.insert(Block::new(start, start + size, tag))?;
    self.next_tag += 1;

    let address = Address::new(self.arena.pointer(start), tag);
    trace!("allocate({}) -> {:?}", size, address);

    Ok(address)
  }

  fn free(
    &mut self,
    address: Address,
  ) -> Option<Block> {
    if address.tag() == 0 {
      return None;
    }

    let Some(block) = self.lookup(address) else {
      warn!("free({:?}) -> not a live block, ignored", address);
      return None;
    };

    let released = self.directory.remove(Some(block));
    trace!("free({:?}) -> released {:?}", address, released);

    released
  }

  /// # Safety
  ///
  /// See [`Heap::resize`].
  unsafe fn resize(
    &mut self,
    address: Option<Address>,
    new_size: usize,
  ) -> Result<Option<Address>> {
    let address = match address {
      Some(address) if address.tag() != 0 => address,
      _ => return self.allocate(new_size).map(Some),
    };

    if new_size == 0 {
      self.free(address);
      return Ok(None);
    }

    if new_size > self.arena.capacity() {
      return Err(Error::CapacityExceeded {
        requested: new_size,
        capacity: self.arena.capacity(),
      });
    }

    let Some(current) = self.lookup(address) else {
      warn!("resize({:?}, {}) -> not a live block, ignored", address, new_size);
      return Ok(None);
    };

    let block = self.block(current);
    let size = align_to!(new_size, self.alignment);

    let limit = self
      .directory
      .next(current)
      .map_or(self.arena.end(), |next| self.block(next).start);

    if block.start + size <= limit {
      if let Some(block) = self.directory.get_mut(current) {
        block.end = block.start + size;
      }
      trace!("resize({:?}, {}) -> in place", address, new_size);
      return Ok(Some(address));
    }

    // The old block stays reserved until the copy is done, so the new one
    // can never overlap it. A failed allocation returns before anything
    // has been touched.
    let moved = self.allocate(new_size)?;

    unsafe {
      self
        .arena
        .copy(block.start, moved.addr(), cmp::min(block.len(), new_size))
    };

    let old = self.lookup(address);
    self.directory.remove(old);

    trace!("resize({:?}, {}) -> moved to {:?}", address, new_size, moved);

    Ok(Some(moved))
  }

  fn lookup(
    &self,
    address: Address,
  ) -> Option<BlockRef> {
    if !self.arena.contains(address.addr()) {
      return None;
    }

    let block = self.directory.find(address.addr())?;

    match self.directory.get(block) {
      Some(live) if live.tag == address.tag() => Some(block),
      _ => None,
    }
  }

  fn block(
    &self,
    block: BlockRef,
  ) -> Block {
    match self.directory.get(block) {
      Some(live) => *live,
      None => unreachable!("dangling block reference {block:?}"),
    }
  }

  /// Start of the first gap, in address order, that holds `size` bytes.
  fn first_fit(
    &self,
    size: usize,
  ) -> Option<usize> {
    let mut previous_end = self.arena.start();
    let mut cursor = self.directory.first();

    while let Some(current) = cursor {
      let block = self.block(current);
      let candidate = align_to!(previous_end, self.alignment);

      if candidate + size <= block.start {
        return Some(candidate);
      }

      previous_end = block.end;
      cursor = self.directory.next(current);
    }

    let candidate = align_to!(previous_end, self.alignment);
    (candidate + size <= self.arena.end()).then_some(candidate)
  }

  /// Usable width of every free gap, in address order, rounded down to the
  /// alignment so each width is itself a request that fits.
  fn gaps(&self) -> impl Iterator<Item = usize> + '_ {
    let ends = self
      .directory
      .iter()
      .map(|block| block.start)
      .chain([self.arena.end()]);
    let starts = [self.arena.start()]
      .into_iter()
      .chain(self.directory.iter().map(|block| block.end));

    starts
      .zip(ends)
      .map(|(start, end)| end.saturating_sub(align_to!(start, self.alignment)) & !(self.alignment - 1))
  }

  fn used(&self) -> usize {
    self.directory.iter().map(Block::len).sum()
  }
}
