//! WebSocket session lifecycle and event dispatch for the shared display.
//!
//! One task per connection reads inbound frames while a dedicated writer task
//! drains the connection's outbound queue, so fan-out from other clients
//! keeps flowing even while a persistence call is pending. The gateway holds
//! no per-client session state beyond the connection itself: a disconnect
//! removes the hub entry and nothing else.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ErrorPayload, PageKey, ServerMessage},
    error::ServiceError,
    services::annotation_service,
    state::{ClientConnection, SharedState},
};

/// Handle the full lifecycle of one connected client.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let client_id = Uuid::new_v4();
    state.clients().insert(ClientConnection {
        id: client_id,
        tx: outbound_tx.clone(),
    });
    info!(id = %client_id, clients = state.clients().len(), "client connected");

    // Seed the new joiner with the current shared state before any relays.
    state
        .clients()
        .send_to(client_id, &ServerMessage::LiveState(state.live_snapshot().await));

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(ClientMessage::Unknown) => {
                    debug!(id = %client_id, "ignoring unknown event");
                }
                Ok(event) => dispatch(&state, client_id, event).await,
                Err(err) => {
                    warn!(id = %client_id, error = %err, "malformed client event ignored");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %client_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %client_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.clients().remove(&client_id);
    info!(id = %client_id, clients = state.clients().len(), "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Apply one inbound event.
///
/// Handlers are isolated: a failing event logs (or reports to its sender)
/// and never tears the connection down or blocks later events.
pub(crate) async fn dispatch(state: &SharedState, sender: Uuid, event: ClientMessage) {
    match event {
        ClientMessage::SetSong(payload) => {
            state
                .update_live(|live| live.set_song(payload.song_id, payload.page))
                .await;
        }
        ClientMessage::SetPage(payload) => {
            if payload.page == 0 {
                warn!(id = %sender, "ignoring page turn to page 0");
                return;
            }
            state.update_live(|live| live.set_page(payload.page)).await;
        }
        ClientMessage::SetSetlist(payload) => {
            state
                .update_live(|live| live.set_setlist(payload.setlist_id))
                .await;
        }
        ClientMessage::Stroke(stroke) => {
            // A single tap leaves no mark; nothing worth relaying.
            if !stroke.is_complete() {
                debug!(id = %sender, "discarding incomplete stroke");
                return;
            }
            // The sender already drew it locally; echoing it back would
            // double-apply the stroke.
            state
                .clients()
                .broadcast_except(sender, &ServerMessage::Stroke(stroke));
        }
        ClientMessage::Erase(payload) => {
            state
                .clients()
                .broadcast_except(sender, &ServerMessage::Erase(payload));
        }
        ClientMessage::Clear(key) => {
            match annotation_service::clear(state, key.song_id, Some(key.page)).await {
                // Idempotent full-page wipe: echo to everyone, sender
                // included, so all views converge on the durable truth.
                Ok(_) => state.clients().broadcast_all(&ServerMessage::Clear(key)),
                Err(err) => report_failure(state, sender, "draw:clear", &err),
            }
        }
        ClientMessage::Save(payload) => {
            let key = PageKey {
                song_id: payload.song_id,
                page: payload.page,
            };
            match annotation_service::save(
                state,
                payload.song_id,
                payload.page,
                payload.data,
                payload.author,
            )
            .await
            {
                // Acknowledge only after the write committed; the ack carries
                // no strokes, recipients re-fetch via the read path.
                Ok(()) => state.clients().broadcast_all(&ServerMessage::Saved(key)),
                Err(err) => report_failure(state, sender, "draw:save", &err),
            }
        }
        ClientMessage::Unknown => {}
    }
}

/// Surface a persistence failure to the originating client only, leaving its
/// local buffer intact for a retry. Other clients never see the attempt.
fn report_failure(state: &SharedState, sender: Uuid, event: &str, err: &ServiceError) {
    warn!(id = %sender, event, error = %err, "event handler failed");
    state.clients().send_to(
        sender,
        &ServerMessage::Error(ErrorPayload {
            event: event.to_string(),
            message: err.to_string(),
        }),
    );
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::NewSong,
            sheet_store::{
                SheetStore,
                sqlite::{SqliteConfig, SqliteSheetStore},
            },
        },
        dto::ws::{
            ErasePayload, LiveStateSnapshot, SavePayload, SetPagePayload, SetSetlistPayload,
            SetSongPayload,
        },
        ink::{Stroke, StrokePoint},
        state::AppState,
    };

    /// In-process stand-in for a connected WebSocket client: registered in
    /// the hub like a real connection, but frames land in a channel we can
    /// inspect.
    struct TestClient {
        id: Uuid,
        rx: mpsc::UnboundedReceiver<Message>,
    }

    impl TestClient {
        fn join(state: &SharedState) -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = Uuid::new_v4();
            state.clients().insert(ClientConnection { id, tx });
            Self { id, rx }
        }

        fn next_event(&mut self) -> ServerMessage {
            match self.rx.try_recv() {
                Ok(Message::Text(text)) => {
                    serde_json::from_str(&text).expect("well-formed server frame")
                }
                other => panic!("expected a text frame, got {other:?}"),
            }
        }

        fn assert_silent(&mut self) {
            assert!(self.rx.try_recv().is_err(), "expected no pending frames");
        }
    }

    async fn bare_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    async fn state_with_song() -> (SharedState, SqliteSheetStore, i64) {
        let state = AppState::new(AppConfig::default());
        let store = SqliteSheetStore::connect(&SqliteConfig {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
        })
        .await
        .expect("in-memory store");

        let song = store
            .insert_song(NewSong {
                title: "opus".into(),
                artist: String::new(),
                filename: "opus.pdf".into(),
                filepath: "/uploads/opus.pdf".into(),
                page_count: 4,
            })
            .await
            .expect("song row");

        state.install_store(Arc::new(store.clone())).await;
        (state, store, song.id)
    }

    fn line(song_id: i64, page: u32, seed: f64) -> Stroke {
        Stroke {
            song_id,
            page,
            color: "#e11d48".into(),
            width: 2.0,
            points: vec![
                StrokePoint { x: seed, y: 0.0 },
                StrokePoint {
                    x: seed + 3.0,
                    y: 4.0,
                },
            ],
        }
    }

    #[tokio::test]
    async fn selecting_a_song_broadcasts_the_full_state_to_everyone() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        dispatch(
            &state,
            leader.id,
            ClientMessage::SetSong(SetSongPayload {
                song_id: 7,
                page: None,
            }),
        )
        .await;

        let expected = ServerMessage::LiveState(LiveStateSnapshot {
            song_id: Some(7),
            page: 1,
            setlist_id: None,
        });
        assert_eq!(leader.next_event(), expected);
        assert_eq!(viewer.next_event(), expected);
        viewer.assert_silent();
    }

    #[tokio::test]
    async fn page_turns_keep_the_song_and_reach_everyone() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);

        dispatch(
            &state,
            leader.id,
            ClientMessage::SetSong(SetSongPayload {
                song_id: 3,
                page: Some(2),
            }),
        )
        .await;
        leader.next_event();

        let mut viewer = TestClient::join(&state);
        dispatch(
            &state,
            leader.id,
            ClientMessage::SetPage(SetPagePayload { page: 3 }),
        )
        .await;

        let expected = ServerMessage::LiveState(LiveStateSnapshot {
            song_id: Some(3),
            page: 3,
            setlist_id: None,
        });
        assert_eq!(leader.next_event(), expected);
        assert_eq!(viewer.next_event(), expected);
    }

    #[tokio::test]
    async fn page_zero_is_ignored_as_malformed() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);

        dispatch(
            &state,
            leader.id,
            ClientMessage::SetPage(SetPagePayload { page: 0 }),
        )
        .await;

        leader.assert_silent();
        assert_eq!(state.live_snapshot().await.page, 1);
    }

    #[tokio::test]
    async fn setlist_selection_does_not_clear_the_song() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);

        dispatch(
            &state,
            leader.id,
            ClientMessage::SetSong(SetSongPayload {
                song_id: 9,
                page: None,
            }),
        )
        .await;
        leader.next_event();

        dispatch(
            &state,
            leader.id,
            ClientMessage::SetSetlist(SetSetlistPayload {
                setlist_id: Some(4),
            }),
        )
        .await;

        assert_eq!(
            leader.next_event(),
            ServerMessage::LiveState(LiveStateSnapshot {
                song_id: Some(9),
                page: 1,
                setlist_id: Some(4),
            })
        );
    }

    #[tokio::test]
    async fn strokes_fan_out_to_everyone_but_the_artist() {
        let state = bare_state().await;
        let mut artist = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);
        let mut other = TestClient::join(&state);

        let stroke = line(1, 1, 0.0);
        dispatch(&state, artist.id, ClientMessage::Stroke(stroke.clone())).await;

        artist.assert_silent();
        assert_eq!(viewer.next_event(), ServerMessage::Stroke(stroke.clone()));
        assert_eq!(other.next_event(), ServerMessage::Stroke(stroke));
    }

    #[tokio::test]
    async fn single_tap_strokes_are_not_relayed() {
        let state = bare_state().await;
        let mut artist = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        let mut tap = line(1, 1, 0.0);
        tap.points.truncate(1);
        dispatch(&state, artist.id, ClientMessage::Stroke(tap)).await;

        artist.assert_silent();
        viewer.assert_silent();
    }

    #[tokio::test]
    async fn erase_indices_are_relayed_to_the_other_clients() {
        let state = bare_state().await;
        let mut artist = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        let payload = ErasePayload {
            song_id: 5,
            page: 2,
            indices: vec![0, 2, 7],
        };
        dispatch(&state, artist.id, ClientMessage::Erase(payload.clone())).await;

        artist.assert_silent();
        assert_eq!(viewer.next_event(), ServerMessage::Erase(payload));
    }

    #[tokio::test]
    async fn clear_wipes_storage_and_echoes_to_everyone() {
        let (state, store, song_id) = state_with_song().await;
        let mut leader = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        store
            .append_annotation(song_id, 1, vec![line(song_id, 1, 0.0)], String::new())
            .await
            .unwrap();

        let key = PageKey { song_id, page: 1 };
        dispatch(&state, leader.id, ClientMessage::Clear(key)).await;

        assert_eq!(leader.next_event(), ServerMessage::Clear(key));
        assert_eq!(viewer.next_event(), ServerMessage::Clear(key));
        assert!(
            store
                .list_annotations(song_id, 1)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn save_persists_the_buffer_and_acks_everyone() {
        let (state, _store, song_id) = state_with_song().await;
        let mut artist = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        let buffer = vec![
            line(song_id, 1, 0.0),
            line(song_id, 1, 10.0),
            line(song_id, 1, 20.0),
        ];
        dispatch(
            &state,
            artist.id,
            ClientMessage::Save(SavePayload {
                song_id,
                page: 1,
                data: buffer.clone(),
                author: Some("lea".into()),
            }),
        )
        .await;

        let key = PageKey { song_id, page: 1 };
        assert_eq!(artist.next_event(), ServerMessage::Saved(key));
        assert_eq!(viewer.next_event(), ServerMessage::Saved(key));

        // A later joiner reconstructs exactly the saved strokes, in order,
        // via the read path.
        let reloaded = annotation_service::page_strokes(&state, song_id, 1)
            .await
            .unwrap();
        assert_eq!(reloaded, buffer);
    }

    #[tokio::test]
    async fn failed_save_is_reported_to_the_sender_only() {
        let state = bare_state().await; // degraded: no storage installed
        let mut artist = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        dispatch(
            &state,
            artist.id,
            ClientMessage::Save(SavePayload {
                song_id: 1,
                page: 1,
                data: vec![line(1, 1, 0.0)],
                author: None,
            }),
        )
        .await;

        match artist.next_event() {
            ServerMessage::Error(payload) => assert_eq!(payload.event, "draw:save"),
            other => panic!("expected an error report, got {other:?}"),
        }
        viewer.assert_silent();
    }

    #[tokio::test]
    async fn failed_clear_is_not_echoed_as_completed() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);
        let mut viewer = TestClient::join(&state);

        dispatch(
            &state,
            leader.id,
            ClientMessage::Clear(PageKey {
                song_id: 1,
                page: 1,
            }),
        )
        .await;

        match leader.next_event() {
            ServerMessage::Error(payload) => assert_eq!(payload.event, "draw:clear"),
            other => panic!("expected an error report, got {other:?}"),
        }
        viewer.assert_silent();
    }

    #[tokio::test]
    async fn new_joiners_are_seeded_with_the_current_snapshot() {
        let state = bare_state().await;
        let mut leader = TestClient::join(&state);
        dispatch(
            &state,
            leader.id,
            ClientMessage::SetSong(SetSongPayload {
                song_id: 2,
                page: Some(3),
            }),
        )
        .await;
        leader.next_event();

        // What handle_socket sends on connect.
        let mut joiner = TestClient::join(&state);
        state
            .clients()
            .send_to(joiner.id, &ServerMessage::LiveState(state.live_snapshot().await));

        assert_eq!(
            joiner.next_event(),
            ServerMessage::LiveState(LiveStateSnapshot {
                song_id: Some(2),
                page: 3,
                setlist_id: None,
            })
        );
    }
}
