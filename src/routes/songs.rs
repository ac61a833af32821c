use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::{
    dto::song::SongResponse, error::AppError, services::library_service, state::SharedState,
};

/// Song library endpoints, with the body limit raised for PDF uploads.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/songs", get(list_songs).post(upload_song))
        .layer(DefaultBodyLimit::max(state.config().max_upload_bytes()))
        .route("/songs/{id}", delete(delete_song))
}

#[utoipa::path(
    get,
    path = "/api/songs",
    tag = "songs",
    responses((status = 200, description = "All songs ordered by title", body = [SongResponse]))
)]
/// List every song in the library.
pub async fn list_songs(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SongResponse>>, AppError> {
    let songs = library_service::list_songs(&state).await?;
    Ok(Json(songs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/songs",
    tag = "songs",
    responses(
        (status = 201, description = "Song registered", body = SongResponse),
        (status = 400, description = "Missing or non-PDF upload")
    )
)]
/// Upload a PDF chart (multipart field `pdf`, optional `title` and `artist`).
pub async fn upload_song(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SongResponse>), AppError> {
    let mut title: Option<String> = None;
    let mut artist: Option<String> = None;
    let mut pdf: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("title") => {
                title = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("artist") => {
                artist = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("pdf") => {
                if field.content_type() != Some("application/pdf") {
                    return Err(AppError::BadRequest("only PDF uploads are accepted".into()));
                }
                let filename = field.file_name().unwrap_or("score.pdf").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                pdf = Some((filename, bytes));
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = pdf else {
        return Err(AppError::BadRequest("PDF file required".into()));
    };

    let song = library_service::create_song(&state, title, artist, filename, bytes).await?;
    Ok((StatusCode::CREATED, Json(song.into())))
}

#[utoipa::path(
    delete,
    path = "/api/songs/{id}",
    tag = "songs",
    params(("id" = i64, Path, description = "Song to delete")),
    responses((status = 204, description = "Song, its file, and its annotations removed"))
)]
/// Delete a song, its PDF on disk, and (by cascade) its annotations.
pub async fn delete_song(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    library_service::delete_song(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid multipart body: {err}"))
}
