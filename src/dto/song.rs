//! Response DTOs for the song library endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{dao::models::SongEntity, dto::format_timestamp};

/// Song row returned by the library endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SongResponse {
    /// Primary key.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Performing artist, possibly empty.
    pub artist: String,
    /// On-disk filename inside the upload directory.
    pub filename: String,
    /// Public path the PDF is served from.
    pub filepath: String,
    /// Number of pages in the PDF.
    pub page_count: u32,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-modification timestamp.
    pub updated_at: String,
}

impl From<SongEntity> for SongResponse {
    fn from(entity: SongEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            artist: entity.artist,
            filename: entity.filename,
            filepath: entity.filepath,
            page_count: entity.page_count,
            created_at: format_timestamp(entity.created_at),
            updated_at: format_timestamp(entity.updated_at),
        }
    }
}
