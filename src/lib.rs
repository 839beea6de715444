//! The jaz command-line frontend.
//!
//! The resolution engine itself lives in the `jaz-resolver` crate (with
//! `jaz-parser` below it and `jaz-emitter` beside it); this crate wires
//! those pieces into a batch driver: argument parsing, file collection,
//! diagnostic rendering, and tracing setup.

pub mod cli;
pub mod tracing_config;
