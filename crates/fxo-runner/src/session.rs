//! Interactive trading session.
//!
//! Wires the feed, the order lifecycle machine, and the trade journal
//! together around an operator prompt loop. Every exit path — clean finish,
//! order error, Ctrl+C — goes through the same streamer teardown sequence:
//! signal stop, wait out the grace period, abort and await on timeout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fxo_core::config::AppConfig;
use fxo_core::error::EngineError;
use fxo_core::types::RaceOutcome;
use fxo_exec::journal::TradeJournal;
use fxo_exec::oanda::{Credentials, OandaClient};
use fxo_exec::order::{OrderContext, OrderManager};
use fxo_exec::{BrokerGateway, race};
use fxo_feed::{PriceFeed, QuoteSource, streamer};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::prompt::{self, Action};

/// Run one interactive session end to end.
pub async fn run(config: AppConfig, journal_dir: &Path) -> Result<()> {
    let risk_pct = prompt::prompt_risk().await?;
    let primary = prompt::prompt_primary_account().await?;
    let credentials = Credentials::from_env(primary)?;
    let client = Arc::new(OandaClient::new(credentials));

    let balance = client
        .fetch_account_balance()
        .await
        .context("cannot fetch account balance")?;
    info!("[session] account balance ${balance:.2}");

    let (alias, instrument) = prompt::prompt_instrument(&config).await?;
    let side = prompt::prompt_side().await?;
    let mut sl_pips = prompt::prompt_sl_pips().await?;

    let journal = Arc::new(TradeJournal::new(journal_dir)?);
    journal.session_start(balance, &alias, side, sl_pips);

    let session = &config.session;
    let feed = PriceFeed::new(session.cache_size, session.price_wait());
    let feed_task = tokio::spawn(streamer::run(
        feed.clone(),
        Arc::clone(&client) as Arc<dyn QuoteSource>,
        instrument.clone(),
        session.feed_interval(),
    ));

    let manager = Arc::new(OrderManager::new(
        Arc::clone(&client) as Arc<dyn BrokerGateway>,
        feed.clone(),
        Arc::clone(&journal),
        OrderContext {
            instrument,
            side,
            account_size: balance,
            risk_pct,
            risk_reward: session.risk_reward,
            poll_interval: session.poll_interval(),
        },
    ));

    let result = tokio::select! {
        outcome = drive(&manager, &mut sl_pips) => outcome,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            Ok("interrupted by operator".to_string())
        }
    };

    let reason = match &result {
        Ok(reason) => reason.clone(),
        Err(e) => format!("aborted: {e:#}"),
    };
    journal.session_end(&reason);
    shutdown_feed(&feed, feed_task, session.teardown_grace()).await;

    result.map(|_| ())
}

/// The operator action loop. Returns the reason the session ended.
async fn drive(manager: &Arc<OrderManager>, sl_pips: &mut f64) -> Result<String> {
    loop {
        match prompt::prompt_action().await? {
            Action::LimitEntry => {
                let ack = manager.place_limit(*sl_pips).await?;
                if ack.fill.is_some() {
                    return Ok("limit order filled on placement".to_string());
                }
                let outcome =
                    race::supervise(Arc::clone(manager), prompt::wait_for_cancel()).await?;
                return Ok(match outcome {
                    RaceOutcome::Filled(_) => "limit order filled".to_string(),
                    RaceOutcome::BrokerCancelled(_) => {
                        "limit order cancelled by broker".to_string()
                    }
                    RaceOutcome::UserCancelled => {
                        "limit order cancelled by operator".to_string()
                    }
                });
            }
            Action::MarketEntry => {
                manager.place_market(*sl_pips).await?;
                return Ok("market order executed".to_string());
            }
            Action::ChangeSlPips => {
                *sl_pips = prompt::prompt_sl_pips().await?;
                info!("[session] stop-loss set to {sl_pips} pips");
            }
        }
    }
}

/// Tear the streamer down: signal stop, give it the grace period to drain,
/// then abort and await the task if it overruns.
async fn shutdown_feed(
    feed: &PriceFeed,
    mut feed_task: JoinHandle<Result<(), EngineError>>,
    grace: Duration,
) {
    feed.stop();
    match tokio::time::timeout(grace, &mut feed_task).await {
        Ok(Ok(Ok(()))) => info!("[session] streamer stopped cleanly"),
        Ok(Ok(Err(e))) => warn!("[session] streamer exited with error: {e}"),
        Ok(Err(e)) => error!("[session] streamer task panicked: {e}"),
        Err(_) => {
            let err = EngineError::TeardownTimeout { grace };
            warn!("[session] {err} — aborting streamer task");
            feed_task.abort();
            let _ = feed_task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Sets a flag when dropped — observes that an aborted task was truly
    /// torn down.
    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn overrunning_streamer_is_aborted_after_grace() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));

        let torn_down = Arc::new(AtomicBool::new(false));
        let guard_flag = Arc::clone(&torn_down);
        // a streamer that ignores the stop signal entirely
        let task = tokio::spawn(async move {
            let _guard = SetOnDrop(guard_flag);
            std::future::pending::<Result<(), EngineError>>().await
        });

        shutdown_feed(&feed, task, Duration::from_secs(2)).await;

        assert!(feed.is_stopped());
        // the grace period expired and the task was aborted and joined
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cooperative_streamer_joins_within_grace() {
        let feed = PriceFeed::new(30, Duration::from_secs(1));

        let watcher = feed.clone();
        let task = tokio::spawn(async move {
            while !watcher.is_stopped() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Ok::<(), EngineError>(())
        });

        shutdown_feed(&feed, task, Duration::from_secs(2)).await;
        assert!(feed.is_stopped());
    }
}
