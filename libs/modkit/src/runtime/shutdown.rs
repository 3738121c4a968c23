use anyhow::Result;

/// Resolves once the process is asked to stop (SIGTERM / SIGINT, or Ctrl+C
/// where unix signals are unavailable). Intended for
/// `axum::serve(..).with_graceful_shutdown(..)`.
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let which = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!(signal = which, "shutdown requested");
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!(signal = "ctrl_c", "shutdown requested");
        Ok(())
    }
}

/// Adapter for APIs that want an infallible shutdown future; a failure to
/// install the handler is logged and the future never resolves.
pub async fn shutdown_signal() {
    if let Err(e) = wait_for_shutdown().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
        std::future::pending::<()>().await;
    }
}
