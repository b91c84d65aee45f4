use foodwise_config::NotifierSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::sweep::ExpirySweep;

/// Periodic driver for the expiry sweep: one run shortly after startup
/// (warm-up lets storage connections settle), then one per fixed interval.
/// Sweeps run sequentially on a single background task, so two sweeps can
/// never overlap; a tick that fires while a sweep is still in flight is
/// skipped rather than queued.
pub struct ExpiryScheduler;

impl ExpiryScheduler {
    pub fn spawn(sweep: Arc<ExpirySweep>, settings: &NotifierSettings) -> SchedulerHandle {
        let warmup = Duration::from_secs(settings.warmup_delay_secs);
        let interval = Duration::from_secs(settings.sweep_interval_secs);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        info!(
            interval_secs = settings.sweep_interval_secs,
            warmup_secs = settings.warmup_delay_secs,
            "Starting expiry notification scheduler"
        );

        let join = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(warmup) => {}
                _ = shutdown_rx.changed() => return,
            }

            info!("Running initial expiry sweep on startup");
            sweep.run().await;

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of a fresh interval completes immediately;
            // the startup sweep above already covered it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweep.run().await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Expiry scheduler shutting down");
                        return;
                    }
                }
            }
        });

        SchedulerHandle { shutdown_tx, join }
    }
}

/// Cancellation handle: stops accepting new ticks, lets an in-flight sweep
/// finish, then joins the background task.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.join.await {
            warn!(%err, "Expiry scheduler task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::DaoResult;
    use crate::notify::dispatch::{Dispatcher, LogOnlyEmail, LogOnlySms};
    use crate::notify::sweep::{InventorySource, UserSource};
    use async_trait::async_trait;
    use bson::oid::ObjectId;
    use foodwise_db::models::{Item, User};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts sweep passes via the user-source seam.
    struct CountingUsers(Arc<AtomicUsize>);

    #[async_trait]
    impl UserSource for CountingUsers {
        async fn notifiable_users(&self) -> DaoResult<Vec<User>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct EmptyInventory;

    #[async_trait]
    impl InventorySource for EmptyInventory {
        async fn expiring_items(&self, _: ObjectId, _: i64) -> DaoResult<Vec<Item>> {
            Ok(Vec::new())
        }
    }

    fn sweep(runs: Arc<AtomicUsize>) -> Arc<ExpirySweep> {
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(LogOnlySms),
            Arc::new(LogOnlyEmail),
            "91".to_string(),
        ));
        Arc::new(ExpirySweep::new(
            Arc::new(CountingUsers(runs)),
            Arc::new(EmptyInventory),
            dispatcher,
            3,
        ))
    }

    fn settings(warmup: u64, interval: u64) -> NotifierSettings {
        NotifierSettings {
            enabled: true,
            default_country_code: "91".to_string(),
            sweep_interval_secs: interval,
            warmup_delay_secs: warmup,
            default_reminder_days: 3,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_once_after_warmup_then_on_every_tick() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = ExpiryScheduler::spawn(sweep(runs.clone()), &settings(5, 60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        // Past warm-up: the startup sweep has run
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Two interval ticks
        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_future_ticks() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = ExpiryScheduler::spawn(sweep(runs.clone()), &settings(0, 60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        handle.shutdown().await;

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_warmup_never_sweeps() {
        let runs = Arc::new(AtomicUsize::new(0));
        let handle = ExpiryScheduler::spawn(sweep(runs.clone()), &settings(60, 60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await;

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
