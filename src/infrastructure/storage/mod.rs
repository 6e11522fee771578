mod disk;
#[cfg(test)]
mod memory;

pub use disk::*;
#[cfg(test)]
pub use memory::*;
