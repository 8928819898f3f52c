//! Address-ordered table of busy blocks.
//!
//! ```text
//!   slots:  ┌────────┬────────┬────────┬────────┬────────┬────────┐
//!           │ 0x1000 │  ----  │ 0x1200 │ 0x1280 │  ----  │  ----  │
//!           │ 0x1100 │        │ 0x1280 │ 0x1300 │        │        │
//!           └────────┴────────┴────────┴────────┴────────┴────────┘
//!            live      empty    live     live     empty    empty
//!
//!   capacity = 6, len = 3
//! ```
//!
//! Live descriptors are always in ascending `start` order when read left to
//! right, skipping empty slots. Removing a block only empties its slot; empty
//! slots are reused by later inserts and squeezed out by [`BlockDirectory::compact`].
//! Free space is never stored here: it is whatever lies between two
//! consecutive live descriptors.

use log::debug;

use crate::{
  block::Block,
  error::{Error, Result},
};

/// Position of a live descriptor inside the directory.
///
/// A reference stays valid until the next call that takes the directory by
/// `&mut self`, apart from [`BlockDirectory::get_mut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef(usize);

#[derive(Debug, Default)]
pub struct BlockDirectory {
  slots: Vec<Option<Block>>,
  live: usize,
}

impl BlockDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Result<Self> {
    let mut directory = Self::new();
    directory.grow_to(capacity)?;
    Ok(directory)
  }

  /// Number of live descriptors.
  pub fn len(&self) -> usize {
    self.live
  }

  pub fn is_empty(&self) -> bool {
    self.live == 0
  }

  /// Number of slots, live or empty.
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  pub fn get(
    &self,
    block: BlockRef,
  ) -> Option<&Block> {
    self.slots.get(block.0).and_then(Option::as_ref)
  }

  /// Mutable access to a descriptor. The caller must keep it ordered and
  /// disjoint from its neighbours.
  pub fn get_mut(
    &mut self,
    block: BlockRef,
  ) -> Option<&mut Block> {
    self.slots.get_mut(block.0).and_then(Option::as_mut)
  }

  pub fn first(&self) -> Option<BlockRef> {
    self.live_from(0)
  }

  pub fn next(
    &self,
    block: BlockRef,
  ) -> Option<BlockRef> {
    self.live_from(block.0 + 1)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Block> {
    self.slots.iter().flatten()
  }

  /// Looks up the descriptor starting exactly at `start`.
  pub fn find(
    &self,
    start: usize,
  ) -> Option<BlockRef> {
    for (index, slot) in self.slots.iter().enumerate() {
      match slot {
        Some(block) if block.start == start => return Some(BlockRef(index)),
        Some(block) if block.start > start => return None,
        _ => {}
      }
    }

    None
  }

  /// Inserts `block` at its place in address order.
  ///
  /// `block` must not overlap any live descriptor. Neighbours are shifted
  /// towards the closest empty slot; when there is none the slot count is
  /// doubled first.
  pub fn insert(
    &mut self,
    block: Block,
  ) -> Result<BlockRef> {
    debug_assert!(
      self.iter().all(|live| !live.overlaps(&block)),
      "overlapping insert {:#x}..{:#x}",
      block.start,
      block.end
    );

    if self.live == self.slots.len() {
      let doubled = (self.slots.len() * 2).max(1);
      self.grow_to(doubled)?;
    }

    // First live slot that must stay after the new block.
    let pos = self
      .slots
      .iter()
      .position(|slot| matches!(slot, Some(live) if live.start > block.start))
      .unwrap_or(self.slots.len());

    let index = if pos > 0 && self.slots[pos - 1].is_none() {
      pos - 1
    } else if let Some(hole) = self.empty_from(pos) {
      self.slots[pos..=hole].rotate_right(1);
      pos
    } else if let Some(hole) = self.empty_before(pos) {
      self.slots[hole..pos].rotate_left(1);
      pos - 1
    } else {
      unreachable!("directory with {} free slots has no hole", self.slots.len() - self.live);
    };

    self.slots[index] = Some(block);
    self.live += 1;

    Ok(BlockRef(index))
  }

  /// Drops the referenced descriptor and returns it. `None`, or a reference to
  /// an already empty slot, leaves the directory unchanged.
  pub fn remove(
    &mut self,
    block: Option<BlockRef>,
  ) -> Option<Block> {
    let removed = self.slots.get_mut(block?.0)?.take()?;
    self.live -= 1;
    Some(removed)
  }

  /// Packs every live descriptor into the leading slots, keeping their order.
  pub fn compact(&mut self) {
    let capacity = self.slots.len();
    self.slots.retain(Option::is_some);
    self.slots.resize(capacity, None);

    debug!("block directory compacted: {} live of {} slots", self.live, capacity);
  }

  /// Changes the number of slots. Shrinking compacts first and fails when
  /// `new_capacity` cannot hold every live descriptor.
  pub fn resize_capacity(
    &mut self,
    new_capacity: usize,
  ) -> Result<()> {
    if new_capacity >= self.slots.len() {
      return self.grow_to(new_capacity);
    }

    if new_capacity < self.live {
      return Err(Error::InvalidCapacity {
        requested: new_capacity,
        live: self.live,
      });
    }

    self.compact();
    self.slots.truncate(new_capacity);
    self.slots.shrink_to_fit();

    debug!("block directory shrunk to {} slots", new_capacity);
    Ok(())
  }

  fn grow_to(
    &mut self,
    new_capacity: usize,
  ) -> Result<()> {
    let additional = new_capacity.saturating_sub(self.slots.len());
    if additional == 0 {
      return Ok(());
    }

    self
      .slots
      .try_reserve_exact(additional)
      .map_err(|_| Error::DirectoryExhausted {
        requested_slots: new_capacity,
      })?;
    self.slots.resize(new_capacity, None);

    debug!("block directory grown to {} slots", new_capacity);
    Ok(())
  }

  fn live_from(
    &self,
    index: usize,
  ) -> Option<BlockRef> {
    let offset = self.slots.get(index..)?.iter().position(Option::is_some)?;
    Some(BlockRef(index + offset))
  }

  fn empty_from(
    &self,
    index: usize,
  ) -> Option<usize> {
    let offset = self.slots.get(index..)?.iter().position(Option::is_none)?;
    Some(index + offset)
  }

  fn empty_before(
    &self,
    index: usize,
  ) -> Option<usize> {
    self.slots[..index].iter().rposition(Option::is_none)
  }
}
