use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{extract::State, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::response::AppError;
use crate::state::AppState;

struct SseGuard(Arc<AtomicUsize>);

impl Drop for SseGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

/// One `metrics` event per emitted snapshot. Slow clients skip what they missed.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let max_sse = state.config().limits.max_sse_connections;
    let counter = state.sse_connections().clone();
    let current = counter.fetch_add(1, Ordering::SeqCst);
    if current >= max_sse {
        counter.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests("Too many SSE connections"));
    }
    let guard = SseGuard(counter);

    let mut shutdown_rx = state.shutdown_rx();
    let mut snapshots = state.emitter().subscribe();

    let stream = async_stream::stream! {
        let _guard = guard;
        loop {
            tokio::select! {
                received = snapshots.recv() => match received {
                    Ok(snapshot) => match serde_json::to_string(&snapshot) {
                        Ok(json) => yield Ok(Event::default().event("metrics").data(json)),
                        Err(e) => tracing::error!(error = %e, "Failed to serialize snapshot"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "SSE subscriber lagging, dropped snapshots");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown_rx.recv() => break,
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
