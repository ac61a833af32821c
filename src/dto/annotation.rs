//! Request and response DTOs for the HTTP annotation endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{dao::models::AnnotationRecordEntity, dto::format_timestamp, ink::Stroke};

/// Stored annotation record returned by the read path.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnotationResponse {
    /// Primary key.
    pub id: i64,
    /// Song the record belongs to.
    pub song_id: i64,
    /// 1-based page number.
    pub page: u32,
    /// Ordered strokes stored in this record.
    pub data: Vec<Stroke>,
    /// Who saved the record, possibly empty.
    pub author: String,
    /// RFC 3339 creation timestamp; records flatten in this order.
    pub created_at: String,
}

impl From<AnnotationRecordEntity> for AnnotationResponse {
    fn from(entity: AnnotationRecordEntity) -> Self {
        Self {
            id: entity.id,
            song_id: entity.song_id,
            page: entity.page,
            data: entity.strokes,
            author: entity.author,
            created_at: format_timestamp(entity.created_at),
        }
    }
}

/// Identifier of a freshly appended annotation record.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnotationCreatedResponse {
    /// Primary key of the new record.
    pub id: i64,
}

/// Payload of the append-mode annotation create endpoint.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnnotationRequest {
    /// Target page; defaults to 1.
    pub page: Option<u32>,
    /// Strokes to append to the page's history.
    pub data: Vec<Stroke>,
    /// Display name of the person drawing.
    pub author: Option<String>,
}

/// Page selector for annotation reads and deletes.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct PageQuery {
    /// 1-based page; reads default to page 1, deletes without a page wipe
    /// the whole song.
    #[validate(range(min = 1))]
    pub page: Option<u32>,
}
