mod backend;
mod generation;
mod storage;

pub use backend::*;
pub use generation::*;
pub use storage::*;
