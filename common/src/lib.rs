pub mod markers;
pub mod types;

pub use markers::*;
pub use types::*;
