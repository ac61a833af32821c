/// Stroke persistence workflows shared by the gateway and HTTP routes.
pub mod annotation_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Song library and setlist management.
pub mod library_service;
/// Storage connection supervision and degraded-mode handling.
pub mod storage_supervisor;
/// WebSocket session lifecycle and event dispatch.
pub mod sync_gateway;
