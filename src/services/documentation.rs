use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the MasterSheet backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::songs::list_songs,
        crate::routes::songs::upload_song,
        crate::routes::songs::delete_song,
        crate::routes::annotations::list_annotations,
        crate::routes::annotations::create_annotation,
        crate::routes::annotations::delete_annotations,
        crate::routes::setlists::list_setlists,
        crate::routes::setlists::create_setlist,
        crate::routes::setlists::delete_setlist,
        crate::routes::setlists::list_setlist_songs,
        crate::routes::setlists::add_setlist_song,
        crate::routes::setlists::remove_setlist_song,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::song::SongResponse,
            crate::dto::setlist::SetlistResponse,
            crate::dto::setlist::CreateSetlistRequest,
            crate::dto::setlist::AddSetlistSongRequest,
            crate::dto::setlist::SetlistSongResponse,
            crate::dto::annotation::AnnotationResponse,
            crate::dto::annotation::AnnotationCreatedResponse,
            crate::dto::annotation::CreateAnnotationRequest,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::LiveStateSnapshot,
            crate::dto::ws::SetSongPayload,
            crate::dto::ws::SetPagePayload,
            crate::dto::ws::SetSetlistPayload,
            crate::dto::ws::PageKey,
            crate::dto::ws::ErasePayload,
            crate::dto::ws::SavePayload,
            crate::dto::ws::ErrorPayload,
            crate::ink::Stroke,
            crate::ink::StrokePoint,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "live", description = "WebSocket live sync and drawing relay"),
        (name = "songs", description = "Song library and PDF uploads"),
        (name = "setlists", description = "Setlist management"),
        (name = "annotations", description = "Persisted page annotations"),
    )
)]
pub struct ApiDoc;
