//! Regenerates jaz source from syntax trees, resolved or not.

pub mod printer;

pub use printer::{Printer, emit_unit};
