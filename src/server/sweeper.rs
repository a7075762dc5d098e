use crate::application_port::SessionService;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Periodically drops lineages whose refresh window closed at least one
/// refresh TTL ago.
pub struct SessionSweeper {
    session_service: Arc<dyn SessionService>,
    period: Duration,
    cancellation_token: CancellationToken,
}

impl SessionSweeper {
    pub fn new(
        session_service: Arc<dyn SessionService>,
        period: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            session_service,
            period,
            cancellation_token,
        }
    }

    pub async fn sweep_once(&self) -> usize {
        let evicted = self.session_service.evict_expired().await;
        let live = self.session_service.session_count().await;
        if evicted > 0 {
            info!(evicted, live, "expired sessions evicted");
        } else {
            debug!(live, "session sweep found nothing to evict");
        }
        evicted
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("session sweeper shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }
}
