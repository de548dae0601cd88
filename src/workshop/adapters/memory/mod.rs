//! In-memory adapters for workshop persistence.

mod store;

pub use store::InMemoryWorkshopStore;
