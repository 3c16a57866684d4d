//! Data types shared across the pipeline.

pub mod config;
pub mod listing;
pub mod portal;
pub mod report;
pub mod role;
