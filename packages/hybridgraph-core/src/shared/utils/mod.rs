//! Shared utilities

pub mod id_generator;
pub mod timing;
