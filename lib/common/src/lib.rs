pub mod error;
mod quad_store;

pub use quad_store::{QuadReader, QuadStore, QuadStoreTransaction};
