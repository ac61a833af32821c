use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ink::Stroke;

/// Events accepted from connected WebSocket clients.
///
/// Frames are JSON objects of the form `{"event": "...", "data": {...}}`;
/// unknown event names deserialize to [`ClientMessage::Unknown`] and are
/// ignored by the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Leader selects the active song (and optionally a starting page).
    #[serde(rename = "live:setSong")]
    SetSong(SetSongPayload),
    /// Leader turns to another page of the active song.
    #[serde(rename = "live:setPage")]
    SetPage(SetPagePayload),
    /// Leader selects the active setlist.
    #[serde(rename = "live:setSetlist")]
    SetSetlist(SetSetlistPayload),
    /// A completed freehand stroke to relay to the other clients.
    #[serde(rename = "draw:stroke")]
    Stroke(Stroke),
    /// Indices of strokes erased from the sender's page buffer.
    #[serde(rename = "draw:erase")]
    Erase(ErasePayload),
    /// Wipe every persisted annotation for one page.
    #[serde(rename = "draw:clear")]
    Clear(PageKey),
    /// Persist the sender's full stroke buffer for one page.
    #[serde(rename = "draw:save")]
    Save(SavePayload),
    /// Catch-all for events this server version does not understand.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse a text frame into a client event.
    pub fn from_json_str(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

/// Events pushed to connected WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Full snapshot of the shared session, sent on connect and after every
    /// `live:*` mutation.
    #[serde(rename = "live:state")]
    LiveState(LiveStateSnapshot),
    /// Stroke relayed from another client.
    #[serde(rename = "draw:stroke")]
    Stroke(Stroke),
    /// Erase indices relayed from another client.
    #[serde(rename = "draw:erase")]
    Erase(ErasePayload),
    /// A page's annotations were wiped.
    #[serde(rename = "draw:clear")]
    Clear(PageKey),
    /// Acknowledgement that a save committed; carries no stroke payload, so
    /// recipients re-fetch via the annotation read path.
    #[serde(rename = "draw:saved")]
    Saved(PageKey),
    /// Failure report delivered to the originating client only.
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

/// Detached copy of the shared "now playing" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveStateSnapshot {
    /// Active song, `null` until a song has been selected.
    pub song_id: Option<i64>,
    /// Active page, 1-based.
    pub page: u32,
    /// Active setlist, `null` until one has been selected.
    pub setlist_id: Option<i64>,
}

/// Payload of `live:setSong`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSongPayload {
    /// Song to activate.
    pub song_id: i64,
    /// Starting page; omitted or zero means page 1.
    #[serde(default)]
    pub page: Option<u32>,
}

/// Payload of `live:setPage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SetPagePayload {
    /// Page to turn to, 1-based.
    pub page: u32,
}

/// Payload of `live:setSetlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSetlistPayload {
    /// Setlist to activate; `null` deselects.
    #[serde(default)]
    pub setlist_id: Option<i64>,
}

/// Addresses one page of one song.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    /// Song identifier.
    pub song_id: i64,
    /// 1-based page number.
    pub page: u32,
}

/// Payload of `draw:erase`: positions to drop from the receiver's current
/// stroke ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErasePayload {
    /// Song identifier.
    pub song_id: i64,
    /// 1-based page number.
    pub page: u32,
    /// 0-based indices into the sender's session-local stroke order.
    pub indices: Vec<usize>,
}

/// Payload of `draw:save`: the sender's complete stroke buffer for the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    /// Song identifier.
    pub song_id: i64,
    /// 1-based page number.
    pub page: u32,
    /// Full in-memory stroke buffer; replaces whatever was stored before.
    pub data: Vec<Stroke>,
    /// Display name of the person saving.
    #[serde(default)]
    pub author: Option<String>,
}

/// Sender-only report that an event handler failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorPayload {
    /// Event name the failure belongs to (e.g. `draw:save`).
    pub event: String,
    /// Human-readable reason.
    pub message: String,
}
