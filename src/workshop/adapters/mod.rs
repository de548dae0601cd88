//! Adapter implementations for workshop persistence.

pub mod memory;
mod ordering;
pub mod sql;
