use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::InMemoryRateLimiter;

pub struct BackgroundTasks {
    /// How often expired rate-limit windows are swept.
    pub cleanup_interval: Duration,
}

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let Some(limiter) = rocket.state::<Arc<InMemoryRateLimiter>>() else {
            log::warn!("[task] No rate limiter in managed state; cleanup task not started");
            return;
        };

        // Rate-limit window cleanup task
        let limiter = Arc::clone(limiter);
        let interval = self.cleanup_interval.max(Duration::from_secs(60));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                limiter.cleanup();
                log::debug!("[task] Swept expired rate-limit windows");
            }
        });
    }
}
