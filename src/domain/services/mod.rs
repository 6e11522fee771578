pub mod clipboard;
mod history;
mod session;

pub use history::*;
pub use session::*;
