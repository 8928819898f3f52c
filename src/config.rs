use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapConfig {
  /// Size of the arena in bytes.
  pub capacity: usize,
  /// Block sizes and start addresses are rounded to this power of two.
  /// `1` hands out exactly the requested number of bytes.
  pub alignment: usize,
  /// Number of descriptor slots the directory starts with.
  pub directory_capacity: usize,
}

impl HeapConfig {
  pub const DEFAULT_ALIGNMENT: usize = 1;
  pub const DEFAULT_DIRECTORY_CAPACITY: usize = 16;
  /// Largest alignment the arena base is guaranteed to satisfy.
  pub const MAX_ALIGNMENT: usize = 16;

  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      alignment: Self::DEFAULT_ALIGNMENT,
      directory_capacity: Self::DEFAULT_DIRECTORY_CAPACITY,
    }
  }

  pub fn builder() -> ConfigBuilder {
    ConfigBuilder::new()
  }

  pub fn validate(&self) -> Result<()> {
    if !self.alignment.is_power_of_two() {
      return Err(Error::config("alignment must be a power of two"));
    }

    if self.alignment > Self::MAX_ALIGNMENT {
      return Err(Error::config(format!(
        "alignment too large (max {})",
        Self::MAX_ALIGNMENT
      )));
    }

    if self.capacity > isize::MAX as usize {
      return Err(Error::config("capacity must not exceed isize::MAX"));
    }

    Ok(())
  }
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self::new(0)
  }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
  config: HeapConfig,
}

impl ConfigBuilder {
  pub fn new() -> Self {
    Self {
      config: HeapConfig::default(),
    }
  }

  pub fn capacity(
    mut self,
    capacity: usize,
  ) -> Self {
    self.config.capacity = capacity;
    self
  }

  pub fn alignment(
    mut self,
    alignment: usize,
  ) -> Self {
    self.config.alignment = alignment;
    self
  }

  pub fn directory_capacity(
    mut self,
    slots: usize,
  ) -> Self {
    self.config.directory_capacity = slots;
    self
  }

  pub fn build(self) -> Result<HeapConfig> {
    self.config.validate()?;
    Ok(self.config)
  }
}
