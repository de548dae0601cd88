//! Shopfloor: repair-shop job lifecycle management.
//!
//! This crate tracks clients, vehicles, mechanics, appointments and repair
//! jobs for a vehicle repair shop. Its core is the job lifecycle: an
//! appointment is promoted into a workshop repair exactly once, and a repair
//! advances through its statuses without losing recorded work.
//!
//! # Architecture
//!
//! Shopfloor follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and diesel (`PostgreSQL` or SQLite) stores
//! - **Services**: Lifecycle, scheduling, registry and client portal
//!
//! # Modules
//!
//! - [`workshop`]: Domain, ports, adapters and services
//! - [`config`]: Storage configuration from the environment
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod telemetry;
pub mod workshop;
