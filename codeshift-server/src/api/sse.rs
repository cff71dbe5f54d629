//! Server-Sent Events for change notification streaming

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

/// GET /api/events - SSE stream of all change events
///
/// Forwards every event the bus emits: project/file/analysis mutations,
/// migration completions, and test generation. Clients that connect late
/// see only events emitted after they subscribed.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        loop {
            tokio::select! {
                // Heartbeat every 15 seconds
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    debug!("SSE: Sending heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                result = rx.recv() => {
                    match result {
                        Ok(event) => {
                            let event_type = event.event_type().to_string();
                            match serde_json::to_string(&event) {
                                Ok(event_json) => {
                                    debug!("SSE: Broadcasting event: {}", event_type);
                                    yield Ok(Event::default()
                                        .event(event_type)
                                        .data(event_json));
                                }
                                Err(e) => {
                                    warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                                }
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!("SSE: Client lagged, {} events dropped", n);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
