use anyhow::Result;

/// Resolves on the first SIGINT/SIGTERM (Ctrl+C/Ctrl+Break/close on Windows).
pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("shutdown: SIGTERM"),
            _ = sigint.recv() => tracing::info!("shutdown: SIGINT"),
        }
        Ok(())
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};
        use tokio::time::{timeout, Duration};

        async fn arm_once() -> std::io::Result<()> {
            let mut c = ctrl_c()?;
            let mut br = ctrl_break()?;
            let mut cl = ctrl_close()?;
            tokio::select! {
                _ = c.recv() => {},
                _ = br.recv() => {},
                _ = cl.recv() => {},
            }
            Ok(())
        }

        // A console event right after arming is spurious; wait for the next one.
        match timeout(Duration::from_millis(50), arm_once()).await {
            Ok(Ok(())) => {
                tracing::warn!("shutdown: early console signal ignored");
                arm_once().await?;
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_elapsed) => arm_once().await?,
        }
        Ok(())
    }
}
