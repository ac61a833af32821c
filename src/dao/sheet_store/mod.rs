/// SQLite-backed implementation of [`SheetStore`].
pub mod sqlite;

use futures::future::BoxFuture;

use crate::dao::models::{
    AnnotationRecordEntity, NewSong, SetlistEntity, SetlistSongEntity, SongEntity,
};
use crate::dao::storage::StorageResult;
use crate::ink::Stroke;

/// Abstraction over the persistence layer for the song library, setlists, and
/// page annotations.
///
/// Annotation writes come in two deliberately distinct modes: `replace`
/// supersedes every record for a key with a single new one (the save path),
/// while `append` adds a record alongside the existing ones (the HTTP create
/// path). Mixing the two up duplicates strokes on read, so callers must pick
/// the mode that matches their contract.
pub trait SheetStore: Send + Sync {
    /// Register an uploaded song and return the stored row.
    fn insert_song(&self, song: NewSong) -> BoxFuture<'static, StorageResult<SongEntity>>;
    /// Every song, ordered by title.
    fn list_songs(&self) -> BoxFuture<'static, StorageResult<Vec<SongEntity>>>;
    /// Fetch one song by id.
    fn find_song(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SongEntity>>>;
    /// Delete a song row (annotations and setlist entries cascade) and return
    /// the deleted row so callers can clean up its file.
    fn delete_song(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SongEntity>>>;
    /// Public filepaths of every known song; used to detect orphaned uploads.
    fn list_song_filepaths(&self) -> BoxFuture<'static, StorageResult<Vec<String>>>;

    /// Create a setlist for a date.
    fn insert_setlist(
        &self,
        name: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<SetlistEntity>>;
    /// Setlists newest first, or chronologically within one `YYYY-MM` month.
    fn list_setlists(
        &self,
        month: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<SetlistEntity>>>;
    /// Delete a setlist; entries cascade.
    fn delete_setlist(&self, id: i64) -> BoxFuture<'static, StorageResult<()>>;
    /// Songs of a setlist ordered by position.
    fn list_setlist_songs(
        &self,
        setlist_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<SetlistSongEntity>>>;
    /// Append a song to a setlist; a missing position lands after the last.
    fn add_setlist_song(
        &self,
        setlist_id: i64,
        song_id: i64,
        position: Option<u32>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a single setlist entry by its own id.
    fn remove_setlist_song(&self, entry_id: i64) -> BoxFuture<'static, StorageResult<()>>;

    /// Annotation records for a (song, page) key, ordered by creation time.
    fn list_annotations(
        &self,
        song_id: i64,
        page: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<AnnotationRecordEntity>>>;
    /// Insert an additional record without touching prior ones; returns the
    /// new record id.
    fn append_annotation(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> BoxFuture<'static, StorageResult<i64>>;
    /// Atomically delete every record for the key and insert exactly one new
    /// record holding `strokes`. Concurrent replaces on the same key leave a
    /// single surviving record.
    fn replace_annotations(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every record for one page, or for the whole song when `page` is
    /// `None`. Returns the number of deleted records.
    fn clear_annotations(
        &self,
        song_id: i64,
        page: Option<u32>,
    ) -> BoxFuture<'static, StorageResult<u64>>;

    /// Cheap liveness probe used by the supervisor and health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
