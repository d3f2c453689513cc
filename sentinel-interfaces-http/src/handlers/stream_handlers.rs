// Live feed WebSocket endpoint
//
// One task per connection. The hub owns the channel; this task only drains the
// channel's outbound queue into the socket and reports inbound frames back.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use sentinel_application::ops::ChannelRegistration;
use sentinel_application::AppState;
use sentinel_domain::EventEnvelope;

pub async fn live_feed(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if !state.hub.has_capacity().await {
        warn!(
            max = state.hub.max_channels(),
            "live feed upgrade rejected: channel limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    }
    ws.on_upgrade(move |socket| handle_live_feed(socket, state))
}

async fn handle_live_feed(mut socket: WebSocket, state: AppState) {
    let registration = match state.hub.register().await {
        Ok(registration) => registration,
        Err(err) => {
            // Lost the race past the pre-check.
            warn!("live feed channel refused after upgrade: {}", err);
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    let ChannelRegistration { id, mut outbound } = registration;
    let (mut sender, mut receiver) = socket.split();

    let ping_every = state.config.ws_ping_interval_seconds;
    let period = Duration::from_secs(ping_every.max(1));
    let mut heartbeat = interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            queued = outbound.recv() => {
                let Some(envelope) = queued else {
                    debug!(channel = %id, "live feed queue closed; hanging up");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };
                let Some(text) = encode(&envelope) else {
                    continue;
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    debug!(channel = %id, "live feed write failed; client gone");
                    break;
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        state.hub.handle_inbound(id, text.as_str()).await;
                    }
                    // Invalid UTF-8 decodes lossily and then fails the JSON parse like any other bad frame.
                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes);
                        state.hub.handle_inbound(id, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(channel = %id, "live feed client closed");
                        break;
                    }
                    Some(Err(err)) => {
                        debug!(channel = %id, error = %err, "live feed receive error");
                        break;
                    }
                    // Pings and pongs are answered by axum.
                    Some(Ok(_)) => {}
                }
            }
            _ = heartbeat.tick(), if ping_every > 0 => {
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    debug!(channel = %id, "live feed ping failed; client gone");
                    break;
                }
            }
        }
    }

    state.hub.deregister(id).await;
}

fn encode(envelope: &Arc<EventEnvelope>) -> Option<String> {
    match serde_json::to_string(envelope.as_ref()) {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(kind = envelope.kind().as_str(), "failed to encode envelope: {}", err);
            None
        }
    }
}
