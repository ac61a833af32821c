//! Request and response DTOs for the setlist endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{SetlistEntity, SetlistSongEntity},
    dto::{
        format_timestamp,
        song::SongResponse,
        validation::{validate_date, validate_month},
    },
};

/// Setlist row returned by the setlist endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetlistResponse {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Gig date as `YYYY-MM-DD`.
    pub date: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<SetlistEntity> for SetlistResponse {
    fn from(entity: SetlistEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            date: entity.date,
            created_at: format_timestamp(entity.created_at),
        }
    }
}

/// Payload creating a new setlist.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSetlistRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Gig date; defaults to today when omitted.
    #[validate(custom(function = validate_date))]
    pub date: Option<String>,
}

/// Payload slotting a song into a setlist.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddSetlistSongRequest {
    /// Song to add.
    pub song_id: i64,
    /// Explicit position; defaults to the end of the list.
    pub position: Option<u32>,
}

/// Optional calendar filter for listing setlists.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct MonthQuery {
    /// Restrict results to one `YYYY-MM` month.
    #[validate(custom(function = validate_month))]
    pub month: Option<String>,
}

/// One song of a setlist, with its slot metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetlistSongResponse {
    /// Primary key of the setlist entry (used to remove it).
    pub setlist_song_id: i64,
    /// Order of the song within the setlist.
    pub position: u32,
    /// The referenced song.
    #[serde(flatten)]
    pub song: SongResponse,
}

impl From<SetlistSongEntity> for SetlistSongResponse {
    fn from(entity: SetlistSongEntity) -> Self {
        Self {
            setlist_song_id: entity.entry_id,
            position: entity.position,
            song: entity.song.into(),
        }
    }
}
