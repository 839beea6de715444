//! Native CLI support for the jaz binary.

pub mod args;
pub mod driver;
pub mod reporter;

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;
#[cfg(test)]
#[path = "reporter_tests.rs"]
mod reporter_tests;
