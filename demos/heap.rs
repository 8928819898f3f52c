use std::ptr;

use rheap::{Address, Heap, HeapConfig};

/// Prints where a block landed relative to the arena base.
fn print_alloc(
  heap: &Heap,
  label: &str,
  address: Address,
) {
  println!(
    "[{}] address = {:?}, offset = {}, size = {:?}",
    label,
    address,
    address.addr() - heap.base().as_ptr() as usize,
    heap.block_size(address),
  );
}

fn print_stats(heap: &Heap) {
  println!("    {}", heap.stats());
}

/// A record the demo keeps in heap blocks, linked by handle.
#[repr(C)]
struct Record {
  value: u64,
  next: Option<Address>,
}

fn main() {
  let config = HeapConfig::builder()
    .capacity(1024)
    .alignment(8)
    .build()
    .expect("valid config");

  let heap = Heap::with_config(config).expect("arena of 1024 bytes");

  println!("Heap of {} bytes at {:?}", heap.capacity(), heap.base());
  print_stats(&heap);

  unsafe {
    // --------------------------------------------------------------------
    // 1) Three blocks back to back.
    // --------------------------------------------------------------------
    let first = heap.allocate(128).unwrap();
    let second = heap.allocate(256).unwrap();
    let third = heap.allocate(128).unwrap();
    println!("\n[1] Allocate 128, 256 and 128 bytes");
    print_alloc(&heap, "1a", first);
    print_alloc(&heap, "1b", second);
    print_alloc(&heap, "1c", third);
    print_stats(&heap);

    // --------------------------------------------------------------------
    // 2) Free the first block and ask for a smaller one. First-fit puts it
    //    back at the start of the arena.
    // --------------------------------------------------------------------
    heap.free(first);
    let reused = heap.allocate(64).unwrap();
    println!("\n[2] Free the first block, allocate 64 bytes");
    print_alloc(&heap, "2", reused);
    println!(
      "[2] reused == first? {}",
      if reused.addr() == first.addr() {
        "Yes, it took the freed gap"
      } else {
        "No, it went somewhere else"
      }
    );

    // --------------------------------------------------------------------
    // 3) Grow the last block: nothing follows it, so it stays put.
    // --------------------------------------------------------------------
    ptr::write_bytes(third.as_ptr(), 0xAB, 128);
    let grown = heap.resize(third, 256).unwrap().unwrap();
    println!("\n[3] Grow the last block to 256 bytes");
    print_alloc(&heap, "3", grown);
    println!("[3] same address? {}", grown == third);

    // --------------------------------------------------------------------
    // 4) Grow the middle block: its neighbour is in the way, so it moves
    //    and keeps its contents.
    // --------------------------------------------------------------------
    ptr::write_bytes(second.as_ptr(), 0xCD, 256);
    match heap.resize(second, 384) {
      Ok(Some(moved)) => {
        println!("\n[4] Grow the middle block to 384 bytes");
        print_alloc(&heap, "4", moved);
        println!("[4] first byte after move = 0x{:X}", moved.as_ptr().read());
        heap.free(moved);
      }
      Ok(None) => println!("\n[4] block was not live"),
      Err(err) => println!("\n[4] resize failed: {err}"),
    }
    print_stats(&heap);

    // --------------------------------------------------------------------
    // 5) A handful of linked records living in the heap.
    // --------------------------------------------------------------------
    println!("\n[5] Linked records");
    let mut head: Option<Address> = None;
    for value in 1..=5u64 {
      let node = heap.allocate(size_of::<Record>()).unwrap();
      (node.as_ptr() as *mut Record).write(Record { value, next: head });
      head = Some(node);
    }

    let mut cursor = head;
    while let Some(node) = cursor {
      let record = &*(node.as_ptr() as *const Record);
      println!("    {:?} -> {}", node, record.value);
      cursor = record.next;
      heap.free(node);
    }

    heap.free(reused);
    heap.free(grown);
  }

  // --------------------------------------------------------------------
  // 6) Everything is back: the whole arena fits in one request again.
  // --------------------------------------------------------------------
  print_stats(&heap);
  let whole = heap.allocate(1024).unwrap();
  println!("\n[6] Whole arena in one block");
  print_alloc(&heap, "6", whole);

  heap.deinit();
  println!("\n[7] Heap released.");
}
