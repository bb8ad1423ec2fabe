//! In-memory activity adapter backed by the in-memory task store.

mod repository;

pub use repository::InMemoryActivityRepository;
