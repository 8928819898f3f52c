//! Randomized operation sequences, checked after every call.

use rand::{Rng, SeedableRng, rngs::StdRng};
use rheap::{Address, Error, Heap, HeapConfig};

const CAPACITY: usize = 1024;

struct Model {
  heap: Heap,
  live: Vec<(Address, usize, u8)>,
}

impl Model {
  fn new(config: HeapConfig) -> Self {
    Self {
      heap: Heap::with_config(config).unwrap(),
      live: Vec::new(),
    }
  }

  fn check(&self) {
    let base = self.heap.base().as_ptr() as usize;
    let blocks = self.heap.blocks();

    assert_eq!(blocks.len(), self.live.len());

    for block in &blocks {
      assert!(block.start < block.end);
      assert!(block.start >= base && block.end <= base + self.heap.capacity());
    }

    for pair in blocks.windows(2) {
      assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
    }

    for &(address, len, fill) in &self.live {
      assert!(self.heap.block_size(address).unwrap() >= len);

      let bytes = unsafe { std::slice::from_raw_parts(address.as_ptr(), len) };
      assert!(bytes.iter().all(|&byte| byte == fill), "{address:?} lost its contents");
    }
  }

  fn allocate(
    &mut self,
    size: usize,
    fill: u8,
  ) {
    match self.heap.allocate(size) {
      Ok(address) => {
        unsafe { address.as_ptr().write_bytes(fill, size) };
        self.live.push((address, size, fill));
      }
      Err(err) => assert!(matches!(err, Error::OutOfMemory { .. })),
    }
  }

  fn free(
    &mut self,
    index: usize,
  ) {
    let (address, _, _) = self.live.swap_remove(index);
    self.heap.free(address);
    // A second release of the same handle is ignored.
    self.heap.free(address);
  }

  fn resize(
    &mut self,
    index: usize,
    new_size: usize,
  ) {
    let (address, len, fill) = self.live[index];

    match unsafe { self.heap.resize(address, new_size) } {
      Ok(Some(moved)) => {
        let kept = len.min(new_size);
        unsafe { moved.as_ptr().add(kept).write_bytes(fill, new_size - kept) };
        self.live[index] = (moved, new_size, fill);
      }
      Ok(None) => panic!("live block {address:?} was not recognised"),
      Err(err) => {
        assert!(matches!(err, Error::OutOfMemory { .. }));
        assert_eq!(self.heap.block_size(address), Some(len));
      }
    }
  }
}

fn run(
  seed: u64,
  config: HeapConfig,
) {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut model = Model::new(config);

  for step in 0..2_000 {
    let fill = (step % 251) as u8 + 1;

    match rng.gen_range(0..10) {
      0..=3 => model.allocate(rng.gen_range(1..=128), fill),
      4..=6 if !model.live.is_empty() => {
        let index = rng.gen_range(0..model.live.len());
        model.free(index);
      }
      7..=9 if !model.live.is_empty() => {
        let index = rng.gen_range(0..model.live.len());
        model.resize(index, rng.gen_range(1..=256));
      }
      _ => model.allocate(rng.gen_range(1..=32), fill),
    }

    model.check();
  }

  for (address, _, _) in std::mem::take(&mut model.live) {
    model.heap.free(address);
  }

  assert!(model.heap.allocate(CAPACITY).is_ok());
}

#[test]
fn test_random_sequences() {
  for seed in 0..8 {
    run(seed, HeapConfig::new(CAPACITY));
  }
}

#[test]
fn test_random_sequences_aligned() {
  let config = HeapConfig::builder()
    .capacity(CAPACITY)
    .alignment(8)
    .directory_capacity(1)
    .build()
    .unwrap();

  for seed in 100..104 {
    run(seed, config.clone());
  }
}
