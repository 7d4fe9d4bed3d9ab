use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::time::Instant;

/// Source of time for the session and its decay monitor. Everything that measures inactivity
/// goes through this so that tests can run against tokio's paused clock.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall clock time, only used for stamping log messages.
    fn time(&self) -> DateTime<Local>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
