/// Rounds `value` up to the next multiple of `alignment`, which must be a
/// power of two.
///
/// ```rust
/// use std::mem;
/// use rheap::align_to;
///
/// assert_eq!(align_to!(1, 16), 16);
/// assert_eq!(align_to!(32, 16), 32);
/// assert_eq!(align_to!(7, 1), 7);
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align_to!(13, mem::size_of::<usize>()), 16), // 64 bit machine.
///     4 => assert_eq!(align_to!(11, mem::size_of::<usize>()), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}
