use std::{path::Path, str::FromStr};

use futures::future::BoxFuture;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::SqliteConfig;
use crate::{
    dao::{
        models::{AnnotationRecordEntity, NewSong, SetlistEntity, SetlistSongEntity, SongEntity},
        sheet_store::SheetStore,
        storage::{StorageError, StorageResult},
    },
    ink::Stroke,
};

/// Idempotent schema, applied on every connect. Stroke batches are stored as
/// a JSON `data` column keyed by (song, page), matching the shape clients
/// exchange on the wire.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    artist      TEXT    NOT NULL DEFAULT '',
    filename    TEXT    NOT NULL,
    filepath    TEXT    NOT NULL,
    page_count  INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS setlists (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    date        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS setlist_songs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    setlist_id  INTEGER NOT NULL REFERENCES setlists(id) ON DELETE CASCADE,
    song_id     INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
    position    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS annotations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    song_id     INTEGER NOT NULL REFERENCES songs(id) ON DELETE CASCADE,
    page        INTEGER NOT NULL DEFAULT 1,
    data        TEXT    NOT NULL,
    author      TEXT    NOT NULL DEFAULT '',
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_annotations_song_page ON annotations (song_id, page);
"#;

/// SQLite-backed [`SheetStore`] sharing one connection pool.
///
/// Replace/clear run inside transactions, so concurrent writers on the same
/// (song, page) key serialize at the database and a replace can never leave
/// two surviving records behind.
#[derive(Clone)]
pub struct SqliteSheetStore {
    pool: SqlitePool,
}

impl SqliteSheetStore {
    /// Open the database (creating file and parent directory if missing),
    /// switch to WAL with foreign keys on, and apply the schema.
    pub async fn connect(config: &SqliteConfig) -> StorageResult<Self> {
        if let Some(parent) = file_parent(&config.database_url) {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                StorageError::unavailable(
                    format!("creating database directory {}", parent.display()),
                    err,
                )
            })?;
        }

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|err| {
                StorageError::unavailable(
                    format!("parsing database url `{}`", config.database_url),
                    err,
                )
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|err| StorageError::unavailable("opening sqlite database".into(), err))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|err| StorageError::query("apply schema", err))?;

        Ok(Self { pool })
    }

    async fn insert_song_inner(&self, song: NewSong) -> StorageResult<SongEntity> {
        let created_at = OffsetDateTime::now_utc();
        let stamp = encode_timestamp(created_at)?;
        let result = sqlx::query(
            "INSERT INTO songs (title, artist, filename, filepath, page_count, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.filename)
        .bind(&song.filepath)
        .bind(i64::from(song.page_count))
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::query("insert song", err))?;

        Ok(SongEntity {
            id: result.last_insert_rowid(),
            title: song.title,
            artist: song.artist,
            filename: song.filename,
            filepath: song.filepath,
            page_count: song.page_count,
            created_at,
            updated_at: created_at,
        })
    }

    async fn list_songs_inner(&self) -> StorageResult<Vec<SongEntity>> {
        let rows = sqlx::query("SELECT * FROM songs ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| StorageError::query("list songs", err))?;
        rows.iter().map(song_from_row).collect()
    }

    async fn find_song_inner(&self, id: i64) -> StorageResult<Option<SongEntity>> {
        let row = sqlx::query("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::query("find song", err))?;
        row.as_ref().map(song_from_row).transpose()
    }

    async fn delete_song_inner(&self, id: i64) -> StorageResult<Option<SongEntity>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::query("delete song", err))?;

        let row = sqlx::query("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| StorageError::query("delete song", err))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let song = song_from_row(&row)?;

        sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|err| StorageError::query("delete song", err))?;
        tx.commit()
            .await
            .map_err(|err| StorageError::query("delete song", err))?;

        Ok(Some(song))
    }

    async fn list_song_filepaths_inner(&self) -> StorageResult<Vec<String>> {
        let rows = sqlx::query("SELECT filepath FROM songs")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| StorageError::query("list song filepaths", err))?;
        rows.iter()
            .map(|row| {
                row.try_get("filepath")
                    .map_err(|err| StorageError::query("decode song row", err))
            })
            .collect()
    }

    async fn insert_setlist_inner(&self, name: String, date: String) -> StorageResult<SetlistEntity> {
        let created_at = OffsetDateTime::now_utc();
        let stamp = encode_timestamp(created_at)?;
        let result = sqlx::query("INSERT INTO setlists (name, date, created_at) VALUES (?, ?, ?)")
            .bind(&name)
            .bind(&date)
            .bind(&stamp)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::query("insert setlist", err))?;

        Ok(SetlistEntity {
            id: result.last_insert_rowid(),
            name,
            date,
            created_at,
        })
    }

    async fn list_setlists_inner(&self, month: Option<String>) -> StorageResult<Vec<SetlistEntity>> {
        let rows = match month {
            // Calendar view: one month, chronological.
            Some(month) => {
                sqlx::query(
                    "SELECT * FROM setlists WHERE date LIKE ? ORDER BY date, created_at",
                )
                .bind(format!("{month}%"))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM setlists ORDER BY date DESC, created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|err| StorageError::query("list setlists", err))?;

        rows.iter().map(setlist_from_row).collect()
    }

    async fn delete_setlist_inner(&self, id: i64) -> StorageResult<()> {
        sqlx::query("DELETE FROM setlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::query("delete setlist", err))?;
        Ok(())
    }

    async fn list_setlist_songs_inner(
        &self,
        setlist_id: i64,
    ) -> StorageResult<Vec<SetlistSongEntity>> {
        let rows = sqlx::query(
            "SELECT s.id, s.title, s.artist, s.filename, s.filepath, s.page_count, \
                    s.created_at, s.updated_at, ss.position, ss.id AS entry_id \
             FROM setlist_songs ss \
             JOIN songs s ON s.id = ss.song_id \
             WHERE ss.setlist_id = ? \
             ORDER BY ss.position",
        )
        .bind(setlist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::query("list setlist songs", err))?;

        rows.iter()
            .map(|row| {
                Ok(SetlistSongEntity {
                    entry_id: row
                        .try_get("entry_id")
                        .map_err(|err| StorageError::query("decode setlist entry", err))?,
                    position: row
                        .try_get::<i64, _>("position")
                        .map_err(|err| StorageError::query("decode setlist entry", err))?
                        as u32,
                    song: song_from_row(row)?,
                })
            })
            .collect()
    }

    async fn add_setlist_song_inner(
        &self,
        setlist_id: i64,
        song_id: i64,
        position: Option<u32>,
    ) -> StorageResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::query("add setlist song", err))?;

        let position = match position {
            Some(position) => i64::from(position),
            None => {
                let row = sqlx::query(
                    "SELECT COALESCE(MAX(position), 0) AS last FROM setlist_songs WHERE setlist_id = ?",
                )
                .bind(setlist_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|err| StorageError::query("add setlist song", err))?;
                row.try_get::<i64, _>("last")
                    .map_err(|err| StorageError::query("add setlist song", err))?
                    + 1
            }
        };

        sqlx::query("INSERT INTO setlist_songs (setlist_id, song_id, position) VALUES (?, ?, ?)")
            .bind(setlist_id)
            .bind(song_id)
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(|err| StorageError::query("add setlist song", err))?;
        tx.commit()
            .await
            .map_err(|err| StorageError::query("add setlist song", err))?;
        Ok(())
    }

    async fn remove_setlist_song_inner(&self, entry_id: i64) -> StorageResult<()> {
        sqlx::query("DELETE FROM setlist_songs WHERE id = ?")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::query("remove setlist song", err))?;
        Ok(())
    }

    async fn list_annotations_inner(
        &self,
        song_id: i64,
        page: u32,
    ) -> StorageResult<Vec<AnnotationRecordEntity>> {
        let rows = sqlx::query(
            "SELECT * FROM annotations WHERE song_id = ? AND page = ? ORDER BY created_at, id",
        )
        .bind(song_id)
        .bind(i64::from(page))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::query("list annotations", err))?;

        rows.iter().map(annotation_from_row).collect()
    }

    async fn append_annotation_inner(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> StorageResult<i64> {
        let data = encode_strokes(&strokes)?;
        let stamp = encode_timestamp(OffsetDateTime::now_utc())?;
        let result = sqlx::query(
            "INSERT INTO annotations (song_id, page, data, author, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(song_id)
        .bind(i64::from(page))
        .bind(&data)
        .bind(&author)
        .bind(&stamp)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::query("append annotation", err))?;
        Ok(result.last_insert_rowid())
    }

    async fn replace_annotations_inner(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> StorageResult<()> {
        let data = encode_strokes(&strokes)?;
        let stamp = encode_timestamp(OffsetDateTime::now_utc())?;

        // Delete and insert commit together; a replace either fully
        // supersedes the key or leaves it untouched.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::query("replace annotations", err))?;

        sqlx::query("DELETE FROM annotations WHERE song_id = ? AND page = ?")
            .bind(song_id)
            .bind(i64::from(page))
            .execute(&mut *tx)
            .await
            .map_err(|err| StorageError::query("replace annotations", err))?;

        sqlx::query(
            "INSERT INTO annotations (song_id, page, data, author, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(song_id)
        .bind(i64::from(page))
        .bind(&data)
        .bind(&author)
        .bind(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(|err| StorageError::query("replace annotations", err))?;

        tx.commit()
            .await
            .map_err(|err| StorageError::query("replace annotations", err))?;
        Ok(())
    }

    async fn clear_annotations_inner(
        &self,
        song_id: i64,
        page: Option<u32>,
    ) -> StorageResult<u64> {
        let result = match page {
            Some(page) => {
                sqlx::query("DELETE FROM annotations WHERE song_id = ? AND page = ?")
                    .bind(song_id)
                    .bind(i64::from(page))
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM annotations WHERE song_id = ?")
                    .bind(song_id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|err| StorageError::query("clear annotations", err))?;

        Ok(result.rows_affected())
    }

    async fn health_check_inner(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::query("health check", err))?;
        Ok(())
    }
}

impl SheetStore for SqliteSheetStore {
    fn insert_song(&self, song: NewSong) -> BoxFuture<'static, StorageResult<SongEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert_song_inner(song).await })
    }

    fn list_songs(&self) -> BoxFuture<'static, StorageResult<Vec<SongEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_songs_inner().await })
    }

    fn find_song(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SongEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_song_inner(id).await })
    }

    fn delete_song(&self, id: i64) -> BoxFuture<'static, StorageResult<Option<SongEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.delete_song_inner(id).await })
    }

    fn list_song_filepaths(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { store.list_song_filepaths_inner().await })
    }

    fn insert_setlist(
        &self,
        name: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<SetlistEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert_setlist_inner(name, date).await })
    }

    fn list_setlists(
        &self,
        month: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<SetlistEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_setlists_inner(month).await })
    }

    fn delete_setlist(&self, id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_setlist_inner(id).await })
    }

    fn list_setlist_songs(
        &self,
        setlist_id: i64,
    ) -> BoxFuture<'static, StorageResult<Vec<SetlistSongEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_setlist_songs_inner(setlist_id).await })
    }

    fn add_setlist_song(
        &self,
        setlist_id: i64,
        song_id: i64,
        position: Option<u32>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .add_setlist_song_inner(setlist_id, song_id, position)
                .await
        })
    }

    fn remove_setlist_song(&self, entry_id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.remove_setlist_song_inner(entry_id).await })
    }

    fn list_annotations(
        &self,
        song_id: i64,
        page: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<AnnotationRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_annotations_inner(song_id, page).await })
    }

    fn append_annotation(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .append_annotation_inner(song_id, page, strokes, author)
                .await
        })
    }

    fn replace_annotations(
        &self,
        song_id: i64,
        page: u32,
        strokes: Vec<Stroke>,
        author: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .replace_annotations_inner(song_id, page, strokes, author)
                .await
        })
    }

    fn clear_annotations(
        &self,
        song_id: i64,
        page: Option<u32>,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.clear_annotations_inner(song_id, page).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check_inner().await })
    }
}

/// Parent directory of a file-backed database URL, if any.
fn file_parent(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite:")?;
    let path = path.strip_prefix("//").unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

fn encode_timestamp(timestamp: OffsetDateTime) -> StorageResult<String> {
    timestamp
        .format(&Rfc3339)
        .map_err(|err| StorageError::query("encode timestamp", err))
}

fn decode_timestamp(raw: &str) -> StorageResult<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|err| StorageError::query("decode timestamp", err))
}

fn encode_strokes(strokes: &[Stroke]) -> StorageResult<String> {
    serde_json::to_string(strokes).map_err(|err| StorageError::query("encode strokes", err))
}

fn song_from_row(row: &SqliteRow) -> StorageResult<SongEntity> {
    let decode = |err| StorageError::query("decode song row", err);
    Ok(SongEntity {
        id: row.try_get("id").map_err(decode)?,
        title: row.try_get("title").map_err(decode)?,
        artist: row.try_get("artist").map_err(decode)?,
        filename: row.try_get("filename").map_err(decode)?,
        filepath: row.try_get("filepath").map_err(decode)?,
        page_count: row.try_get::<i64, _>("page_count").map_err(decode)? as u32,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at").map_err(decode)?)?,
        updated_at: decode_timestamp(&row.try_get::<String, _>("updated_at").map_err(decode)?)?,
    })
}

fn setlist_from_row(row: &SqliteRow) -> StorageResult<SetlistEntity> {
    let decode = |err| StorageError::query("decode setlist row", err);
    Ok(SetlistEntity {
        id: row.try_get("id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        date: row.try_get("date").map_err(decode)?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at").map_err(decode)?)?,
    })
}

fn annotation_from_row(row: &SqliteRow) -> StorageResult<AnnotationRecordEntity> {
    let decode = |err| StorageError::query("decode annotation row", err);
    let id: i64 = row.try_get("id").map_err(decode)?;
    let data: String = row.try_get("data").map_err(decode)?;
    let strokes = serde_json::from_str(&data).map_err(|source| StorageError::Corrupt {
        record_id: id,
        source,
    })?;

    Ok(AnnotationRecordEntity {
        id,
        song_id: row.try_get("song_id").map_err(decode)?,
        page: row.try_get::<i64, _>("page").map_err(decode)? as u32,
        strokes,
        author: row.try_get("author").map_err(decode)?,
        created_at: decode_timestamp(&row.try_get::<String, _>("created_at").map_err(decode)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::StrokePoint;

    async fn memory_store() -> SqliteSheetStore {
        SqliteSheetStore::connect(&SqliteConfig {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
        })
        .await
        .expect("in-memory store")
    }

    fn new_song(title: &str) -> NewSong {
        NewSong {
            title: title.into(),
            artist: String::new(),
            filename: format!("{title}.pdf"),
            filepath: format!("/uploads/{title}.pdf"),
            page_count: 1,
        }
    }

    fn stroke(song_id: i64, page: u32, seed: f64) -> Stroke {
        Stroke {
            song_id,
            page,
            color: "#222222".into(),
            width: 2.0,
            points: vec![
                StrokePoint { x: seed, y: 0.0 },
                StrokePoint {
                    x: seed + 5.0,
                    y: 5.0,
                },
            ],
        }
    }

    #[tokio::test]
    async fn replace_supersedes_any_prior_history() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("autumn")).await.unwrap();

        store
            .append_annotation_inner(song.id, 1, vec![stroke(song.id, 1, 0.0)], "ann".into())
            .await
            .unwrap();
        store
            .append_annotation_inner(song.id, 1, vec![stroke(song.id, 1, 10.0)], "ben".into())
            .await
            .unwrap();

        let buffer = vec![stroke(song.id, 1, 20.0), stroke(song.id, 1, 30.0)];
        store
            .replace_annotations_inner(song.id, 1, buffer.clone(), "cleo".into())
            .await
            .unwrap();

        let records = store.list_annotations_inner(song.id, 1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].strokes, buffer);
        assert_eq!(records[0].author, "cleo");
    }

    #[tokio::test]
    async fn list_after_clear_is_empty() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("blues")).await.unwrap();

        store
            .replace_annotations_inner(song.id, 2, vec![stroke(song.id, 2, 0.0)], String::new())
            .await
            .unwrap();
        let deleted = store.clear_annotations_inner(song.id, Some(2)).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(store.list_annotations_inner(song.id, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clearing_without_a_page_wipes_the_whole_song() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("canon")).await.unwrap();

        for page in 1..=3 {
            store
                .append_annotation_inner(
                    song.id,
                    page,
                    vec![stroke(song.id, page, 0.0)],
                    String::new(),
                )
                .await
                .unwrap();
        }

        let deleted = store.clear_annotations_inner(song.id, None).await.unwrap();
        assert_eq!(deleted, 3);
        for page in 1..=3 {
            assert!(store.list_annotations_inner(song.id, page).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn appends_accumulate_in_creation_order() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("dawn")).await.unwrap();

        let first = store
            .append_annotation_inner(song.id, 1, vec![stroke(song.id, 1, 0.0)], String::new())
            .await
            .unwrap();
        let second = store
            .append_annotation_inner(song.id, 1, vec![stroke(song.id, 1, 10.0)], String::new())
            .await
            .unwrap();

        let records = store.list_annotations_inner(song.id, 1).await.unwrap();
        assert_eq!(
            records.iter().map(|record| record.id).collect::<Vec<_>>(),
            vec![first, second]
        );
    }

    #[tokio::test]
    async fn concurrent_replaces_leave_one_surviving_record() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("echoes")).await.unwrap();

        let left = vec![stroke(song.id, 1, 0.0)];
        let right = vec![stroke(song.id, 1, 50.0), stroke(song.id, 1, 60.0)];

        let (a, b) = tokio::join!(
            store.replace_annotations_inner(song.id, 1, left.clone(), "a".into()),
            store.replace_annotations_inner(song.id, 1, right.clone(), "b".into()),
        );
        a.unwrap();
        b.unwrap();

        let records = store.list_annotations_inner(song.id, 1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].strokes == left || records[0].strokes == right);
    }

    #[tokio::test]
    async fn deleting_a_song_cascades_to_its_annotations() {
        let store = memory_store().await;
        let song = store.insert_song_inner(new_song("fugue")).await.unwrap();
        store
            .append_annotation_inner(song.id, 1, vec![stroke(song.id, 1, 0.0)], String::new())
            .await
            .unwrap();

        let deleted = store.delete_song_inner(song.id).await.unwrap();
        assert_eq!(deleted.map(|song| song.title), Some("fugue".into()));
        assert!(store.find_song_inner(song.id).await.unwrap().is_none());
        assert!(store.list_annotations_inner(song.id, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn annotations_require_a_known_song() {
        let store = memory_store().await;
        let result = store
            .append_annotation_inner(999, 1, vec![stroke(999, 1, 0.0)], String::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn setlist_songs_keep_their_positions() {
        let store = memory_store().await;
        let first = store.insert_song_inner(new_song("gold")).await.unwrap();
        let second = store.insert_song_inner(new_song("haze")).await.unwrap();
        let setlist = store
            .insert_setlist_inner("friday gig".into(), "2026-08-07".into())
            .await
            .unwrap();

        store
            .add_setlist_song_inner(setlist.id, first.id, None)
            .await
            .unwrap();
        store
            .add_setlist_song_inner(setlist.id, second.id, None)
            .await
            .unwrap();

        let entries = store.list_setlist_songs_inner(setlist.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].position, 1);
        assert_eq!(entries[0].song.id, first.id);
        assert_eq!(entries[1].position, 2);

        store
            .remove_setlist_song_inner(entries[0].entry_id)
            .await
            .unwrap();
        let remaining = store.list_setlist_songs_inner(setlist.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].song.id, second.id);
    }

    #[tokio::test]
    async fn setlists_filter_by_month() {
        let store = memory_store().await;
        store
            .insert_setlist_inner("valentines".into(), "2026-02-14".into())
            .await
            .unwrap();
        store
            .insert_setlist_inner("spring opener".into(), "2026-03-01".into())
            .await
            .unwrap();

        let february = store
            .list_setlists_inner(Some("2026-02".into()))
            .await
            .unwrap();
        assert_eq!(february.len(), 1);
        assert_eq!(february[0].name, "valentines");

        let all = store.list_setlists_inner(None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest date first when no month filter is given.
        assert_eq!(all[0].name, "spring opener");
    }
}
