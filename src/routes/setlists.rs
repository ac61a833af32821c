use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_valid::Valid;

use crate::{
    dto::setlist::{
        AddSetlistSongRequest, CreateSetlistRequest, MonthQuery, SetlistResponse,
        SetlistSongResponse,
    },
    error::AppError,
    services::library_service,
    state::SharedState,
};

/// Setlist management endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/setlists", get(list_setlists).post(create_setlist))
        .route("/setlists/{id}", delete(delete_setlist))
        .route(
            "/setlists/{id}/songs",
            get(list_setlist_songs).post(add_setlist_song),
        )
        .route(
            "/setlists/{setlist_id}/songs/{entry_id}",
            delete(remove_setlist_song),
        )
}

#[utoipa::path(
    get,
    path = "/api/setlists",
    tag = "setlists",
    params(MonthQuery),
    responses((status = 200, description = "Setlists, newest first (chronological within a month filter)", body = [SetlistResponse]))
)]
/// List setlists, optionally restricted to one calendar month.
pub async fn list_setlists(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<MonthQuery>>,
) -> Result<Json<Vec<SetlistResponse>>, AppError> {
    let setlists = library_service::list_setlists(&state, query.month).await?;
    Ok(Json(setlists.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/setlists",
    tag = "setlists",
    request_body = CreateSetlistRequest,
    responses((status = 201, description = "Setlist created", body = SetlistResponse))
)]
/// Create a setlist; a missing date means today.
pub async fn create_setlist(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateSetlistRequest>>,
) -> Result<(StatusCode, Json<SetlistResponse>), AppError> {
    let setlist = library_service::create_setlist(&state, payload.name, payload.date).await?;
    Ok((StatusCode::CREATED, Json(setlist.into())))
}

#[utoipa::path(
    delete,
    path = "/api/setlists/{id}",
    tag = "setlists",
    params(("id" = i64, Path, description = "Setlist to delete")),
    responses((status = 204, description = "Setlist and its entries removed"))
)]
/// Delete a setlist; its song entries cascade.
pub async fn delete_setlist(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    library_service::delete_setlist(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/setlists/{id}/songs",
    tag = "setlists",
    params(("id" = i64, Path, description = "Setlist to read")),
    responses((status = 200, description = "Songs of the setlist ordered by position", body = [SetlistSongResponse]))
)]
/// List the songs of a setlist in playing order.
pub async fn list_setlist_songs(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SetlistSongResponse>>, AppError> {
    let entries = library_service::setlist_songs(&state, id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/setlists/{id}/songs",
    tag = "setlists",
    params(("id" = i64, Path, description = "Setlist to extend")),
    request_body = AddSetlistSongRequest,
    responses((status = 201, description = "Song slotted into the setlist"))
)]
/// Add a song to a setlist; a missing position lands after the last.
pub async fn add_setlist_song(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Valid(Json(payload)): Valid<Json<AddSetlistSongRequest>>,
) -> Result<StatusCode, AppError> {
    library_service::add_setlist_song(&state, id, payload.song_id, payload.position).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    delete,
    path = "/api/setlists/{setlist_id}/songs/{entry_id}",
    tag = "setlists",
    params(
        ("setlist_id" = i64, Path, description = "Setlist the entry belongs to"),
        ("entry_id" = i64, Path, description = "Setlist entry to remove")
    ),
    responses((status = 204, description = "Entry removed"))
)]
/// Remove one song entry from a setlist.
pub async fn remove_setlist_song(
    State(state): State<SharedState>,
    Path((_setlist_id, entry_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    library_service::remove_setlist_song(&state, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
