//! Repair-shop job lifecycle management.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//!
//! Appointments booked through the scheduling desk are promoted into
//! workshop repairs at most once; repairs then move through the shop floor
//! until they are finalized.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
