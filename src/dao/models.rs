use time::OffsetDateTime;

use crate::ink::Stroke;

/// Row describing one uploaded sheet-music PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct SongEntity {
    /// Primary key.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Performing artist, possibly empty.
    pub artist: String,
    /// On-disk filename inside the upload directory.
    pub filename: String,
    /// Public path the client fetches the PDF from (`/uploads/...`).
    pub filepath: String,
    /// Number of pages in the PDF; viewers use this to clamp page turns.
    pub page_count: u32,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last modification timestamp.
    pub updated_at: OffsetDateTime,
}

/// Fields required to register a new song.
#[derive(Debug, Clone)]
pub struct NewSong {
    /// Display title.
    pub title: String,
    /// Performing artist, possibly empty.
    pub artist: String,
    /// On-disk filename inside the upload directory.
    pub filename: String,
    /// Public path the client fetches the PDF from.
    pub filepath: String,
    /// Page count, defaulting to 1 until known.
    pub page_count: u32,
}

/// A dated setlist grouping songs for one gig.
#[derive(Debug, Clone, PartialEq)]
pub struct SetlistEntity {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Gig date as `YYYY-MM-DD`.
    pub date: String,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
}

/// One song slotted into a setlist at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct SetlistSongEntity {
    /// Primary key of the setlist entry itself (not the song).
    pub entry_id: i64,
    /// Order of the song within the setlist.
    pub position: u32,
    /// The referenced song row.
    pub song: SongEntity,
}

/// Durable batch of strokes for one (song, page) key.
///
/// A page may own several records; its current visual state is the
/// concatenation of their stroke runs in creation order. A save collapses the
/// set back to a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecordEntity {
    /// Primary key.
    pub id: i64,
    /// Song the annotations belong to.
    pub song_id: i64,
    /// 1-based page number.
    pub page: u32,
    /// Ordered strokes stored in this record.
    pub strokes: Vec<Stroke>,
    /// Display name of whoever saved the record, possibly empty.
    pub author: String,
    /// Creation timestamp; drives the flattening order.
    pub created_at: OffsetDateTime,
}
