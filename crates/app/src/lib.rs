#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod routes;
pub mod sessions;

use std::future::Future;
use std::time::Duration;

use services::AppServices;
use tokio::net::TcpListener;

pub use routes::{ApiError, AppState, router};

/// Serve the API on `listener` until `shutdown` resolves, then wait for the
/// quiz loop's background writes and verse lookups to finish.
///
/// Sessions idle for longer than `session_ttl` are dropped in the background.
///
/// # Errors
///
/// Returns the underlying I/O error if the server fails.
pub async fn serve(
    listener: TcpListener,
    services: AppServices,
    session_ttl: Duration,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let quiz_loop = services.quiz_loop();
    let state = AppState::new(services);
    let sweeper = state.sessions().spawn_sweeper(session_ttl);
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await;
    sweeper.abort();
    served?;

    tracing::info!(
        pending = quiz_loop.background_tasks().len(),
        "draining background tasks"
    );
    quiz_loop.wait_for_background().await;
    Ok(())
}
