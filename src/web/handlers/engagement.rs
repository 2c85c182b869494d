//! Engagement WebSocket endpoint
//!
//! One connection is one viewer session. Inbound text frames are playback
//! events; outbound frames are the video's `live_update` snapshots.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, warn};

use crate::errors::AppError;
use crate::services::LiveEngagementService;
use crate::utils::is_valid_video_id;
use crate::web::AppState;

/// Upgrade to a viewer session for `video_id`
pub async fn engagement_socket(
    Path(video_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    if !is_valid_video_id(&video_id) {
        warn!(video_id = %video_id, "Rejected engagement connection with invalid video id");
        return AppError::validation(format!("Invalid video id: {}", video_id)).into_response();
    }

    let service = state.engagement.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, service, video_id))
}

async fn handle_socket(socket: WebSocket, service: LiveEngagementService, video_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = service.outbound_channel();
    let shutdown = service.shutdown_token();

    let mut session = service.open_session(video_id);
    if let Err(e) = session.activate(outbound_tx).await {
        error!(session_id = %session.id(), "Failed to activate viewer session: {}", e);
        let _ = ws_sender.close().await;
        return;
    }

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(session_id = %session.id(), "Server shutting down, closing viewer session");
                break;
            }
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    session.handle_text(text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Binary frames carry nothing; pings are answered by the transport
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(session_id = %session.id(), "WebSocket receive error: {}", e);
                    break;
                }
            },
            outbound = outbound_rx.recv() => {
                let Some(update) = outbound else { break };
                let payload = match serde_json::to_string(update.as_ref()) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!(session_id = %session.id(), "Failed to encode live update: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(Message::Text(payload.into())).await {
                    debug!(session_id = %session.id(), "WebSocket send failed: {}", e);
                    break;
                }
            }
        }
    }

    session.close().await;
    let _ = ws_sender.close().await;
}
