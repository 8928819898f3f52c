//! # rheap - A First-Fit Arena Heap
//!
//! This crate provides a thread-safe **first-fit heap** that carves a single,
//! fixed-size arena into variable-length blocks and recycles freed blocks for
//! later requests.
//!
//! ## Overview
//!
//! The heap only remembers where the busy blocks are. Free space is whatever
//! lies between them:
//!
//! ```text
//!   Arena:
//!
//!   base                                                          base + capacity
//!   ┌──────────┬───────────┬────────────────┬──────────┬──────────────────────┐
//!   │    A0    │   (gap)   │       A1       │    A2    │        (gap)         │
//!   └──────────┴───────────┴────────────────┴──────────┴──────────────────────┘
//!
//!   Block directory (sorted by start):
//!
//!   ┌─────────────────┬─────────────────┬─────────────────┐
//!   │ A0: start..end  │ A1: start..end  │ A2: start..end  │
//!   └─────────────────┴─────────────────┴─────────────────┘
//!
//!   A request walks the directory from the lowest address and takes the
//!   first gap that is wide enough. Freeing A1 removes its descriptor and the
//!   two gaps around it become one automatically.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rheap
//!   ├── align      - Alignment macro (align_to!)
//!   ├── arena      - The fixed byte range being managed
//!   ├── block      - Block descriptors and caller handles
//!   ├── config     - HeapConfig and its builder
//!   ├── directory  - Address-ordered table of busy blocks
//!   ├── error      - Error type
//!   ├── heap       - Heap: allocate, free, resize
//!   └── stats      - Diagnostic snapshots
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rheap::Heap;
//!
//! let heap = Heap::init(1024).unwrap();
//!
//! let block = heap.allocate(64).unwrap();
//! unsafe { block.as_ptr().write_bytes(0xAB, 64) };
//!
//! // Grows in place: nothing follows the block.
//! let grown = unsafe { heap.resize(block, 128) }.unwrap().unwrap();
//! assert_eq!(grown, block);
//!
//! heap.free(grown);
//! heap.deinit();
//! ```
//!
//! ## Resizing
//!
//! ```text
//!   In place (the gap after the block is wide enough):
//!
//!   ┌──────────┬─────────────────┐        ┌────────────────────┬──────┐
//!   │    B     │      (gap)      │   ->   │         B'         │(gap) │
//!   └──────────┴─────────────────┘        └────────────────────┴──────┘
//!
//!   Moving (a neighbour is in the way):
//!
//!   ┌──────────┬──────┬─────────────────┐  ┌──────────┬──────┬───────────────┐
//!   │    B     │  C   │      (gap)      │->│  (gap)   │  C   │      B'       │
//!   └──────────┴──────┴─────────────────┘  └──────────┴──────┴───────────────┘
//!                                            contents of B copied into B'
//! ```
//!
//! ## Concurrency
//!
//! One reader/writer lock guards the arena and the directory together.
//! `allocate`, `free` and `resize` take it exclusively; `contains`,
//! `block_size`, `blocks`, `stats` and `with_directory` share it.
//!
//! ## Limitations
//!
//! - **One arena**: the heap never grows beyond the capacity given at init
//! - **Linear placement**: allocation walks every busy block
//! - **Not a global allocator**: no size classes, no per-thread caches
//!
//! ## Safety
//!
//! Handles are raw pointers into the arena. Reading or writing through them,
//! and resizing a block that might move, require `unsafe`.

pub mod align;
mod arena;
mod block;
mod config;
mod directory;
mod error;
mod heap;
mod stats;

pub use block::{Address, Block};
pub use config::{ConfigBuilder, HeapConfig};
pub use directory::{BlockDirectory, BlockRef};
pub use error::{Error, Result};
pub use heap::Heap;
pub use stats::HeapStats;
