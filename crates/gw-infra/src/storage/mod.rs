//! Handoff store adapters.

mod file;
mod memory;

pub use file::FileHandoffStore;
pub use memory::MemoryHandoffStore;
