use tokio::signal;

#[cfg(unix)]
async fn terminate() -> &'static str {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
            "sigterm"
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to install SIGTERM handler");
            std::future::pending().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate() -> &'static str {
    std::future::pending().await
}

async fn interrupt() -> &'static str {
    match signal::ctrl_c().await {
        Ok(()) => "ctrl_c",
        Err(err) => {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending().await
        }
    }
}

/// Resolves on the first of Ctrl+C or SIGTERM; in-flight requests are then
/// drained by `axum::serve`.
pub(crate) async fn shutdown_signal() {
    let source = tokio::select! {
        source = interrupt() => source,
        source = terminate() => source,
    };

    tracing::info!(signal = source, "Shutdown signal received, draining requests");
}
