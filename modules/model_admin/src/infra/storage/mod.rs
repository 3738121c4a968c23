mod eval;
pub mod memory;

pub use memory::{MemoryDatabase, MemoryRecordStore};
