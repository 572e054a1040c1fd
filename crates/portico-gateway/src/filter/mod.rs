//! Filter revision storage.

mod store;

pub use store::InMemoryFilterStore;
