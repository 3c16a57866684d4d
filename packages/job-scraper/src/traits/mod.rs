//! Trait abstractions at the pipeline's I/O seams.

pub mod fetcher;
pub mod store;
