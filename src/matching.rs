//! The matching engine

pub mod engine;

pub use engine::{Grammar, NodeFactory, Parsed, DEFAULT_MAX_DEPTH};
