/// Database model definitions.
pub mod models;
/// Persistence operations for songs, setlists, and annotations.
pub mod sheet_store;
/// Storage abstraction layer shared by all backends.
pub mod storage;
