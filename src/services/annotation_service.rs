//! Stroke persistence workflows shared by the WebSocket gateway and the HTTP
//! annotation routes.
//!
//! Two write modes exist on purpose: `save` replaces a page's whole history
//! with the caller's buffer, `append` adds a record next to the existing
//! ones. The gateway saves, the HTTP create path appends.

use tracing::debug;

use crate::{
    dao::models::AnnotationRecordEntity, error::ServiceError, ink::Stroke, state::SharedState,
};

/// Annotation records for one (song, page) key, ordered by creation.
pub async fn list(
    state: &SharedState,
    song_id: i64,
    page: u32,
) -> Result<Vec<AnnotationRecordEntity>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.list_annotations(song_id, page).await?)
}

/// The page's current visual state: every record's stroke run flattened in
/// creation order.
pub async fn page_strokes(
    state: &SharedState,
    song_id: i64,
    page: u32,
) -> Result<Vec<Stroke>, ServiceError> {
    let records = list(state, song_id, page).await?;
    Ok(records
        .into_iter()
        .flat_map(|record| record.strokes)
        .collect())
}

/// Replace the page's records with a single record holding `strokes`.
///
/// Incomplete strokes (fewer than two points) leave no visible mark and are
/// dropped before the write.
pub async fn save(
    state: &SharedState,
    song_id: i64,
    page: u32,
    strokes: Vec<Stroke>,
    author: Option<String>,
) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    let strokes = keep_complete(strokes, song_id, page);
    store
        .replace_annotations(song_id, page, strokes, author.unwrap_or_default())
        .await?;
    Ok(())
}

/// Append one record to the page's history; returns the new record id.
pub async fn append(
    state: &SharedState,
    song_id: i64,
    page: u32,
    strokes: Vec<Stroke>,
    author: Option<String>,
) -> Result<i64, ServiceError> {
    let store = state.require_store().await?;
    let strokes = keep_complete(strokes, song_id, page);
    Ok(store
        .append_annotation(song_id, page, strokes, author.unwrap_or_default())
        .await?)
}

/// Delete every record for one page, or the whole song when `page` is `None`.
pub async fn clear(
    state: &SharedState,
    song_id: i64,
    page: Option<u32>,
) -> Result<u64, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.clear_annotations(song_id, page).await?)
}

fn keep_complete(mut strokes: Vec<Stroke>, song_id: i64, page: u32) -> Vec<Stroke> {
    let submitted = strokes.len();
    strokes.retain(Stroke::is_complete);
    if strokes.len() < submitted {
        debug!(
            song_id,
            page,
            dropped = submitted - strokes.len(),
            "dropped incomplete strokes before persisting"
        );
    }
    strokes
}
