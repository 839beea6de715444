//! Scanner, parser, and arena syntax tree for the jaz language.
//!
//! The language is a Java-like subset sufficient for static-semantic
//! resolution: packages and imports, classes and interfaces with
//! inheritance, fields, methods, constructors, and a practical statement
//! and expression grammar. Nodes live in a per-unit [`node::NodeArena`]
//! addressed by [`node::NodeId`].

pub mod node;
pub mod parser;
pub mod scanner;

pub use node::{BinaryOp, Literal, Node, NodeArena, NodeId, NodeKind, Primitive, UnaryOp};
pub use parser::{ParsedUnit, parse_unit};
