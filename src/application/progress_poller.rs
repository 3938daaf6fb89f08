use std::time::Duration;

use futures::stream::{self, AbortHandle, BoxStream, StreamExt};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{
    api::ApiClient,
    domain::{AppError, ProgressSnapshot},
};

/// One progress fetch, tagged with the session that started the poller.
/// `Ok(None)` means the server answered without a progress value.
#[derive(Debug, Clone)]
pub struct PollEvent {
    pub generation: u64,
    pub result: Result<Option<ProgressSnapshot>, AppError>,
}

/// Owning handle of a running poller. Stopping is idempotent.
#[derive(Debug)]
pub struct PollerHandle {
    generation: u64,
    abort: AbortHandle,
}

impl PollerHandle {
    pub fn new(generation: u64, abort: AbortHandle) -> Self {
        Self { generation, abort }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stop(&self) {
        if !self.abort.is_aborted() {
            debug!(generation = self.generation, "stopping progress poller");
            self.abort.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.abort.is_aborted()
    }
}

#[derive(Clone)]
pub struct ProgressPoller {
    client: ApiClient,
    interval: Duration,
}

impl ProgressPoller {
    pub fn new(client: ApiClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Returns a stream that hits `/progreso` once per interval (first fetch
    /// after one interval) until the handle is stopped. Failed fetches are
    /// logged and yielded as errors; they never end the stream.
    pub fn start(&self, generation: u64) -> (BoxStream<'static, PollEvent>, PollerHandle) {
        let client = self.client.clone();
        let period = self.interval;

        let ticks = stream::unfold(None::<Interval>, move |ticker| {
            let client = client.clone();
            async move {
                // The timer is created lazily so it binds to the executor's runtime.
                let mut ticker = ticker.unwrap_or_else(|| {
                    let mut interval = time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    interval
                });
                ticker.tick().await;

                let result = client.progress().await.map_err(AppError::from);
                if let Err(e) = &result {
                    warn!(generation, error = %e, "progress poll failed");
                }

                Some((PollEvent { generation, result }, Some(ticker)))
            }
        });

        let (ticks, abort) = stream::abortable(ticks);
        debug!(generation, ?period, "progress poller started");
        (ticks.boxed(), PollerHandle::new(generation, abort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    fn poller_for(server: &mockito::Server) -> ProgressPoller {
        let client = ApiClient::new(AppConfig {
            base_url: server.url(),
            ..AppConfig::default()
        })
        .unwrap();
        ProgressPoller::new(client, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_ticks_carry_generation_and_snapshot() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/progreso")
            .with_body(json!({"progress": 33.333, "converting": false}).to_string())
            .expect_at_least(2)
            .create_async()
            .await;

        let (stream, handle) = poller_for(&server).start(7);
        let events: Vec<PollEvent> = stream.take(2).collect().await;
        handle.stop();

        assert_eq!(events.len(), 2);
        for event in events {
            assert_eq!(event.generation, 7);
            assert_eq!(event.result.unwrap().map(|s| s.percent), Some(33.3));
        }
    }

    #[tokio::test]
    async fn test_failed_ticks_do_not_stop_polling() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/progreso")
            .with_status(503)
            .create_async()
            .await;

        let (stream, handle) = poller_for(&server).start(1);
        let events: Vec<PollEvent> = stream.take(3).collect().await;
        handle.stop();

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.result.is_err()));
    }

    #[tokio::test]
    async fn test_stop_ends_stream_and_is_idempotent() {
        let server = mockito::Server::new_async().await;
        let (mut stream, handle) = poller_for(&server).start(2);

        assert!(!handle.is_stopped());
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        assert!(stream.next().await.is_none());
    }
}
