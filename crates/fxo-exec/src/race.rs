//! Cancellation race coordinator.
//!
//! Supervises one pending order by racing the lifecycle machine's status
//! poll against an operator cancel request. Exactly one side produces the
//! authoritative outcome; the loser is aborted *and awaited* before this
//! module returns, so no task outlives the supervision call.

use std::future::Future;
use std::sync::Arc;

use fxo_core::error::EngineError;
use fxo_core::types::{OrderOutcome, RaceOutcome};
use tracing::{info, warn};

use crate::order::OrderManager;

/// Race the status poll against `cancel_requested` for a pending order.
///
/// - Poll wins: the cancel listener is torn down and any cancel request
///   arriving afterwards is discarded. The broker's verdict (fill or
///   out-of-band cancel) becomes the outcome.
/// - Cancel wins: the poll task is torn down first, then the cancel is sent
///   to the broker. A fill that lands in the instant before the cancel call
///   shows up as the broker's rejection and is propagated as an error, not
///   reported as a successful cancellation.
pub async fn supervise<C>(
    manager: Arc<OrderManager>,
    cancel_requested: C,
) -> Result<RaceOutcome, EngineError>
where
    C: Future<Output = ()> + Send + 'static,
{
    let mut poll_task = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move { manager.poll_until_terminal().await }
    });
    let mut cancel_task = tokio::spawn(cancel_requested);

    tokio::select! {
        poll_result = &mut poll_task => {
            cancel_task.abort();
            let _ = cancel_task.await;

            let outcome = poll_result
                .map_err(|e| EngineError::Gateway(format!("status poll task failed: {e}")))??;
            match outcome {
                OrderOutcome::Filled(snapshot) => {
                    info!("[race] poll won — order filled");
                    Ok(RaceOutcome::Filled(snapshot))
                }
                OrderOutcome::Cancelled(snapshot) => {
                    warn!("[race] poll won — order cancelled by broker");
                    Ok(RaceOutcome::BrokerCancelled(snapshot))
                }
            }
        }
        cancel_result = &mut cancel_task => {
            // tear the poll down before touching the order, so cancel and
            // terminal-detection can never mutate state concurrently
            poll_task.abort();
            let _ = poll_task.await;

            if let Err(e) = cancel_result {
                return Err(EngineError::Gateway(format!("cancel listener failed: {e}")));
            }
            info!("[race] operator cancel won");
            manager.cancel().await?;
            Ok(RaceOutcome::UserCancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use fxo_core::types::OrderStatus;

    use super::*;
    use crate::order::tests::{MockGateway, manager_with, test_context};

    /// Sets a flag when dropped — observes that an aborted task was truly
    /// torn down.
    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    async fn pending_manager(gateway: Arc<MockGateway>) -> Arc<OrderManager> {
        let (manager, feed) = manager_with(gateway, test_context(1000));
        feed.add(1.09998, 1.10000).await;
        manager.place_limit(20.0).await.unwrap();
        Arc::new(manager)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn poll_win_tears_down_listener() {
        let gateway = Arc::new(MockGateway::pending_then(vec![
            OrderStatus::Pending,
            OrderStatus::Filled,
        ]));
        let manager = pending_manager(Arc::clone(&gateway)).await;

        let torn_down = Arc::new(AtomicBool::new(false));
        let guard_flag = Arc::clone(&torn_down);
        let listener = async move {
            let _guard = SetOnDrop(guard_flag);
            std::future::pending::<()>().await;
        };

        let outcome = supervise(manager, listener).await.unwrap();
        assert!(matches!(outcome, RaceOutcome::Filled(_)));
        // the listener was cancelled and joined before supervise returned
        assert!(torn_down.load(Ordering::SeqCst));
        // the cancel path never ran
        assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cancel_win_tears_down_poll() {
        // broker stays pending forever
        let gateway = Arc::new(MockGateway::pending_then(vec![OrderStatus::Pending]));
        let manager = pending_manager(Arc::clone(&gateway)).await;

        let listener = async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
        };

        let outcome = supervise(Arc::clone(&manager), listener).await.unwrap();
        assert!(matches!(outcome, RaceOutcome::UserCancelled));
        assert_eq!(manager.status().await, OrderStatus::Cancelled);
        assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 1);

        // the poll task is dead: the fetch count stops moving
        let fetches = gateway.fetch_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(gateway.fetch_calls.load(Ordering::SeqCst), fetches);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn broker_cancel_win_is_tagged() {
        let gateway = Arc::new(MockGateway::pending_then(vec![
            OrderStatus::Pending,
            OrderStatus::Cancelled,
        ]));
        let manager = pending_manager(gateway).await;

        let outcome = supervise(manager, std::future::pending()).await.unwrap();
        assert!(matches!(outcome, RaceOutcome::BrokerCancelled(_)));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn fill_racing_cancel_surfaces_broker_rejection() {
        // operator cancels, but the broker already filled: the cancel call
        // is rejected and that rejection must be the result
        let mut gateway = MockGateway::pending_then(vec![OrderStatus::Pending]);
        gateway.reject_cancel = true;
        let gateway = Arc::new(gateway);
        let manager = pending_manager(Arc::clone(&gateway)).await;

        let result = supervise(manager, async {}).await;
        assert!(matches!(result, Err(EngineError::Gateway(_))));
        assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn both_ready_produces_exactly_one_outcome() {
        // fill and cancel signal are both immediately ready; whichever
        // branch wins, the loser must be joined and only one authoritative
        // outcome may surface
        let gateway = Arc::new(MockGateway::pending_then(vec![OrderStatus::Filled]));
        let manager = pending_manager(Arc::clone(&gateway)).await;

        let torn_down = Arc::new(AtomicBool::new(false));
        let guard_flag = Arc::clone(&torn_down);
        let listener = async move {
            let _guard = SetOnDrop(guard_flag);
        };

        let outcome = supervise(Arc::clone(&manager), listener).await.unwrap();
        match outcome {
            RaceOutcome::Filled(_) => {
                assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 0);
            }
            RaceOutcome::UserCancelled => {
                assert_eq!(gateway.cancel_calls.load(Ordering::SeqCst), 1);
            }
            RaceOutcome::BrokerCancelled(_) => panic!("broker never cancelled"),
        }
        // the losing task is gone either way
        assert!(torn_down.load(Ordering::SeqCst));
    }
}
