//! blockpool — command line driver for the block pool allocator.

pub mod app;
pub mod config;
pub mod errors;
pub mod presenter;
pub mod version;
pub mod workload;
