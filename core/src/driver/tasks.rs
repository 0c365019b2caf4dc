use tokio::task::JoinHandle;

/// Handle to a spawned driver loop
#[derive(Debug)]
pub struct DriverHandle {
    task: Option<JoinHandle<()>>,
}

impl DriverHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// True once the loop has stopped (aborted, or a callback panicked)
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop the loop and wait for it to wind down.
    ///
    /// A loop that died from a callback panic is reported here.
    pub async fn shutdown(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();

        match task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => tracing::error!(error = %e, "Timer driver stopped abnormally"),
        }
        tracing::info!("Timer driver stopped");
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
