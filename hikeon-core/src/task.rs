use std::{future::Future, sync::Mutex};
use tokio::task::AbortHandle;

/// At most one request in flight per input field.
///
/// Starting a new run aborts the previous one, so only the latest request can
/// deliver a result. Dropping the guard cancels whatever is still running.
#[derive(Debug, Default)]
pub struct SingleFlight {
    current: Mutex<Option<AbortHandle>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fut` on the tokio runtime. `None` means it was superseded or cancelled.
    pub async fn run<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(fut);

        let previous = self.lock().replace(handle.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }

        match handle.await {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => {
                tracing::debug!("request superseded");
                None
            }
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SingleFlight {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    /// Spawns a run that never finishes on its own and waits until it has started.
    async fn start_pending(flight: &Arc<SingleFlight>) -> tokio::task::JoinHandle<Option<&'static str>> {
        let (started_tx, started_rx) = oneshot::channel();
        let flight = flight.clone();

        let waiter = tokio::spawn(async move {
            flight
                .run(async move {
                    let _ = started_tx.send(());
                    std::future::pending::<()>().await;
                    "first"
                })
                .await
        });

        started_rx.await.expect("first run started");
        waiter
    }

    #[tokio::test]
    async fn returns_value_of_single_run() {
        let flight = SingleFlight::new();
        assert_eq!(flight.run(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn newer_run_supersedes_older_one() {
        let flight = Arc::new(SingleFlight::new());
        let first = start_pending(&flight).await;

        let second = flight.run(async { "second" }).await;

        assert_eq!(second, Some("second"));
        assert_eq!(first.await.unwrap(), None);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_run() {
        let flight = Arc::new(SingleFlight::new());
        let first = start_pending(&flight).await;

        flight.cancel();

        assert_eq!(first.await.unwrap(), None);
    }

    #[tokio::test]
    async fn guard_is_reusable_after_completion() {
        let flight = SingleFlight::new();

        assert_eq!(flight.run(async { 1 }).await, Some(1));
        assert_eq!(flight.run(async { 2 }).await, Some(2));
    }
}
