mod content;
mod log;
mod store;
mod transaction;

pub use store::MemoryQuadStore;
pub use transaction::MemoryTransaction;
