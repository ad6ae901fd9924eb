#![doc(test(attr(deny(warnings))))]

//! Contains quad store implementations for [RDF Update](https://docs.rs/rdf-update/).

pub mod memory;

pub use memory::MemoryQuadStore;
