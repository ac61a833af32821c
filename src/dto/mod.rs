use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Annotation read/create DTOs.
pub mod annotation;
/// Health endpoint response.
pub mod health;
/// Setlist request and response DTOs.
pub mod setlist;
/// Song library response DTOs.
pub mod song;
/// Validation helpers for DTOs.
pub mod validation;
/// WebSocket event envelopes and payloads.
pub mod ws;

/// RFC 3339 rendering used by every timestamp-bearing response.
fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
