use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::annotation::{
        AnnotationCreatedResponse, AnnotationResponse, CreateAnnotationRequest, PageQuery,
    },
    error::AppError,
    services::annotation_service,
    state::SharedState,
};

/// Annotation endpoints nested under a song.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route(
        "/songs/{id}/annotations",
        get(list_annotations)
            .post(create_annotation)
            .delete(delete_annotations),
    )
}

#[utoipa::path(
    get,
    path = "/api/songs/{id}/annotations",
    tag = "annotations",
    params(("id" = i64, Path, description = "Song the annotations belong to"), PageQuery),
    responses((status = 200, description = "Records for the page in creation order", body = [AnnotationResponse]))
)]
/// List stored annotation records for one page (default page 1).
pub async fn list_annotations(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Valid(Query(query)): Valid<Query<PageQuery>>,
) -> Result<Json<Vec<AnnotationResponse>>, AppError> {
    let records = annotation_service::list(&state, id, query.page.unwrap_or(1)).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/songs/{id}/annotations",
    tag = "annotations",
    params(("id" = i64, Path, description = "Song the annotations belong to")),
    request_body = CreateAnnotationRequest,
    responses((status = 201, description = "Record appended", body = AnnotationCreatedResponse))
)]
/// Append an annotation record to a page's history.
///
/// This is the append-mode write path; live sessions persist through the
/// replace-mode save event instead.
pub async fn create_annotation(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Valid(Json(payload)): Valid<Json<CreateAnnotationRequest>>,
) -> Result<(StatusCode, Json<AnnotationCreatedResponse>), AppError> {
    let record_id = annotation_service::append(
        &state,
        id,
        payload.page.unwrap_or(1),
        payload.data,
        payload.author,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(AnnotationCreatedResponse { id: record_id }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/songs/{id}/annotations",
    tag = "annotations",
    params(("id" = i64, Path, description = "Song the annotations belong to"), PageQuery),
    responses((status = 204, description = "Records removed"))
)]
/// Delete a page's records, or every page of the song when no page is given.
pub async fn delete_annotations(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Valid(Query(query)): Valid<Query<PageQuery>>,
) -> Result<StatusCode, AppError> {
    annotation_service::clear(&state, id, query.page).await?;
    Ok(StatusCode::NO_CONTENT)
}
