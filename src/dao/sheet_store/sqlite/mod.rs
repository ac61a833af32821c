mod store;

pub use store::SqliteSheetStore;

/// Connection settings for the SQLite backend.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// sqlx-style database URL (e.g. `sqlite:data/band.db`).
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/band.db".into(),
            max_connections: 5,
        }
    }
}
