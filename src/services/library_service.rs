//! Song library and setlist management: uploads on disk, rows in storage.

use std::{
    collections::HashSet,
    io::ErrorKind,
    path::Path,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::body::Bytes;
use rand::Rng;
use time::OffsetDateTime;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    dao::{
        models::{NewSong, SetlistEntity, SetlistSongEntity, SongEntity},
        sheet_store::SheetStore,
    },
    dto::validation::DATE_FORMAT,
    error::ServiceError,
    state::SharedState,
};

/// Every song in the library, ordered by title.
pub async fn list_songs(state: &SharedState) -> Result<Vec<SongEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_songs().await?)
}

/// Store a validated PDF upload on disk and register it in the library.
///
/// The file gets a `millis-rand-originalname` filename so repeated uploads of
/// the same chart never collide.
pub async fn create_song(
    state: &SharedState,
    title: Option<String>,
    artist: Option<String>,
    original_filename: String,
    bytes: Bytes,
) -> Result<SongEntity, ServiceError> {
    let store = state.require_store().await?;

    let filename = unique_filename(&original_filename);
    let upload_dir = state.config().upload_dir();
    fs::create_dir_all(upload_dir).await?;
    fs::write(upload_dir.join(&filename), &bytes).await?;

    let title = title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| derive_title(&original_filename));
    let filepath = format!("/uploads/{filename}");
    let song = store
        .insert_song(NewSong {
            title,
            artist: artist.unwrap_or_default(),
            filename,
            filepath,
            page_count: 1,
        })
        .await?;

    info!(id = song.id, file = %song.filename, "registered uploaded song");
    Ok(song)
}

/// Delete a song row (annotations cascade) and its file on disk.
pub async fn delete_song(state: &SharedState, id: i64) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let Some(song) = store.delete_song(id).await? else {
        return Ok(());
    };

    let path = state.config().upload_dir().join(&song.filename);
    match fs::remove_file(&path).await {
        Ok(()) => info!(id, file = %song.filename, "deleted song and its file"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!(id, error = %err, "song row deleted but file removal failed"),
    }
    Ok(())
}

/// Setlists newest first, or chronologically within one month.
pub async fn list_setlists(
    state: &SharedState,
    month: Option<String>,
) -> Result<Vec<SetlistEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_setlists(month).await?)
}

/// Create a setlist; a missing date means today.
pub async fn create_setlist(
    state: &SharedState,
    name: String,
    date: Option<String>,
) -> Result<SetlistEntity, ServiceError> {
    let store = state.require_store().await?;
    let date = date.unwrap_or_else(today);
    Ok(store.insert_setlist(name, date).await?)
}

/// Delete a setlist; its entries cascade.
pub async fn delete_setlist(state: &SharedState, id: i64) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    Ok(store.delete_setlist(id).await?)
}

/// Songs of a setlist, ordered by position.
pub async fn setlist_songs(
    state: &SharedState,
    setlist_id: i64,
) -> Result<Vec<SetlistSongEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_setlist_songs(setlist_id).await?)
}

/// Slot a song into a setlist; a missing position lands after the last.
pub async fn add_setlist_song(
    state: &SharedState,
    setlist_id: i64,
    song_id: i64,
    position: Option<u32>,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    Ok(store.add_setlist_song(setlist_id, song_id, position).await?)
}

/// Remove one setlist entry by its own id.
pub async fn remove_setlist_song(state: &SharedState, entry_id: i64) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    Ok(store.remove_setlist_song(entry_id).await?)
}

/// Re-import PDFs sitting in the upload directory that the database lost
/// track of (e.g. after restoring uploads without the database file).
pub async fn reimport_orphan_uploads(
    store: &Arc<dyn SheetStore>,
    upload_dir: &Path,
) -> Result<usize, ServiceError> {
    let known: HashSet<String> = store.list_song_filepaths().await?.into_iter().collect();

    let mut entries = match fs::read_dir(upload_dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let mut imported = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        let filepath = format!("/uploads/{name}");
        if known.contains(&filepath) {
            continue;
        }

        let title = derive_title(&name);
        store
            .insert_song(NewSong {
                title,
                artist: String::new(),
                filename: name,
                filepath,
                page_count: 1,
            })
            .await?;
        imported += 1;
    }

    Ok(imported)
}

/// Unique on-disk name for an upload, keeping the original name visible.
fn unique_filename(original: &str) -> String {
    // Strip any client-supplied path components.
    let original = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("{millis}-{suffix}-{original}")
}

/// Human-readable title for a filename: unique prefix stripped, extension
/// dropped, separators spaced.
fn derive_title(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("pdf") => stem,
        _ => filename,
    };
    strip_unique_prefix(stem).replace(['-', '_'], " ")
}

/// Undo [`unique_filename`]'s `millis-rand-` prefix if present.
fn strip_unique_prefix(stem: &str) -> &str {
    let Some((first, rest)) = stem.split_once('-') else {
        return stem;
    };
    if first.is_empty() || !first.bytes().all(|byte| byte.is_ascii_digit()) {
        return stem;
    }
    let Some((second, rest)) = rest.split_once('-') else {
        return stem;
    };
    if second.is_empty() || !second.bytes().all(|byte| byte.is_ascii_digit()) {
        return stem;
    }
    rest
}

fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| "1970-01-01".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_titles_from_upload_filenames() {
        assert_eq!(
            derive_title("1722430000000-4821-My_Song-Live.pdf"),
            "My Song Live"
        );
        assert_eq!(derive_title("autumn-leaves.PDF"), "autumn leaves");
        assert_eq!(derive_title("plain.pdf"), "plain");
        assert_eq!(derive_title("no_extension"), "no extension");
    }

    #[test]
    fn leaves_non_prefixed_stems_alone() {
        assert_eq!(strip_unique_prefix("blue-bossa"), "blue-bossa");
        assert_eq!(strip_unique_prefix("12-blue-bossa"), "12-blue-bossa");
        assert_eq!(strip_unique_prefix("12-34-blue"), "blue");
    }

    #[test]
    fn unique_filenames_keep_the_original_visible() {
        let name = unique_filename("chart.pdf");
        assert!(name.ends_with("-chart.pdf"));
        assert_eq!(name.matches('-').count(), 2);

        let traversal = unique_filename("../../etc/passwd.pdf");
        assert!(traversal.ends_with("-passwd.pdf"));
        assert!(!traversal.contains('/'));
    }
}
