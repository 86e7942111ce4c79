//! Runtime values produced by resolvers and the built-in scalars.

pub mod base;
pub mod containers;
pub mod scalars;
