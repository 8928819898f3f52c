pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("request of {requested} bytes exceeds arena capacity of {capacity} bytes")]
  CapacityExceeded { requested: usize, capacity: usize },

  #[error("no free gap of {requested} bytes left in the arena")]
  OutOfMemory { requested: usize },

  #[error("block directory could not grow to {requested_slots} slots")]
  DirectoryExhausted { requested_slots: usize },

  #[error("could not obtain an arena of {capacity} bytes")]
  ArenaUnavailable { capacity: usize },

  #[error("directory capacity {requested} is below the {live} live blocks")]
  InvalidCapacity { requested: usize, live: usize },

  #[error("config error: {0}")]
  Config(String),
}

impl Error {
  pub fn config<S: Into<String>>(msg: S) -> Self {
    Error::Config(msg.into())
  }

  /// Whether the caller may retry once other blocks are released.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, Error::OutOfMemory { .. })
  }
}
