//! Order lifecycle machine.
//!
//! Owns the single in-flight order for a session and drives it through
//! `NONE → PENDING → {FILLED, CANCELLED}` (with a direct `NONE → FILLED`
//! shortcut for synchronous fills). Status only ever moves forward;
//! terminal states are absorbing no matter what later reads report.
//!
//! All methods take `&self`: the status poll and the cancel path run from
//! separate tasks during the pending window, so mutable state sits behind a
//! `tokio::sync::Mutex` that is held only across short critical sections,
//! never across a gateway call's await on the poll path's sleep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fxo_core::config::InstrumentConfig;
use fxo_core::error::EngineError;
use fxo_core::sizing;
use fxo_core::types::{
    OrderAck, OrderKind, OrderOutcome, OrderRecord, OrderRequest, OrderSnapshot, OrderStatus, Side,
    TimeInForce,
};
use fxo_feed::PriceFeed;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::BrokerGateway;
use crate::journal::{TradeJournal, TradeRecord};

/// Session-scoped inputs that never change while an order is in flight.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub instrument: InstrumentConfig,
    pub side: Side,
    pub account_size: f64,
    pub risk_pct: f64,
    pub risk_reward: f64,
    pub poll_interval: Duration,
}

struct OrderState {
    record: OrderRecord,
    kind: Option<OrderKind>,
    /// Last broker snapshot observed by the poll loop; fixed once terminal.
    last_snapshot: Option<OrderSnapshot>,
}

impl OrderState {
    /// Advance the status, ignoring any movement out of a terminal state.
    fn transition(&mut self, next: OrderStatus) {
        if !self.record.status.is_terminal() {
            self.record.status = next;
        }
    }
}

/// The order lifecycle machine.
pub struct OrderManager {
    gateway: Arc<dyn BrokerGateway>,
    feed: PriceFeed,
    journal: Arc<TradeJournal>,
    context: OrderContext,
    state: Mutex<OrderState>,
}

impl OrderManager {
    pub fn new(
        gateway: Arc<dyn BrokerGateway>,
        feed: PriceFeed,
        journal: Arc<TradeJournal>,
        context: OrderContext,
    ) -> Self {
        let record = OrderRecord::empty(&context.instrument.symbol, context.side);
        Self {
            gateway,
            feed,
            journal,
            context,
            state: Mutex::new(OrderState {
                record,
                kind: None,
                last_snapshot: None,
            }),
        }
    }

    /// Current status of the tracked order.
    pub async fn status(&self) -> OrderStatus {
        self.state.lock().await.record.status
    }

    /// A copy of the tracked order record.
    pub async fn record(&self) -> OrderRecord {
        self.state.lock().await.record.clone()
    }

    /// Place a limit order at the current tradeable price.
    ///
    /// Sizes the position off the session risk settings, derives TP/SL from
    /// the stop-loss distance, and submits a GTC limit. The ack's `fill`
    /// field reports a synchronous (marketable) execution.
    pub async fn place_limit(&self, sl_pips: f64) -> Result<OrderAck, EngineError> {
        let price = self.feed.current_price(self.context.side).await?;
        self.place(OrderKind::Limit, Some(price), sl_pips, TimeInForce::Gtc)
            .await
    }

    /// Place a market order (fill-or-kill). The current price is still read
    /// from the feed to anchor the TP/SL distances.
    pub async fn place_market(&self, sl_pips: f64) -> Result<OrderAck, EngineError> {
        let price = self.feed.current_price(self.context.side).await?;
        self.place(OrderKind::Market, Some(price), sl_pips, TimeInForce::Fok)
            .await
            .inspect_err(|e| {
                // market entries are fire-and-confirm; record the failure
                // with whatever id we have
                self.journal.record_error(&e.to_string(), None);
            })
    }

    async fn place(
        &self,
        kind: OrderKind,
        current_price: Option<f64>,
        sl_pips: f64,
        time_in_force: TimeInForce,
    ) -> Result<OrderAck, EngineError> {
        {
            let state = self.state.lock().await;
            if state.record.status != OrderStatus::None {
                return Err(EngineError::Placement(format!(
                    "an order is already active (status {})",
                    state.record.status
                )));
            }
        }

        let ctx = &self.context;
        let anchor = current_price.unwrap_or_default();

        let units = sizing::position_size(
            ctx.account_size,
            &ctx.instrument.symbol,
            ctx.risk_pct,
            ctx.side,
            sl_pips,
            ctx.instrument.pip_value,
        );
        let (take_profit, stop_loss) = sizing::tp_sl_prices(
            ctx.side,
            anchor,
            sl_pips,
            ctx.instrument.pip_value,
            ctx.instrument.precision,
            ctx.risk_reward,
        );

        let request = OrderRequest {
            kind,
            instrument: ctx.instrument.symbol.clone(),
            units,
            price: (kind == OrderKind::Limit).then_some(anchor),
            take_profit,
            stop_loss,
            time_in_force,
        };

        debug!(
            "[order] submitting {} {}: units={units}, tp={take_profit}, sl={stop_loss}",
            kind.as_wire_str(),
            ctx.instrument.symbol,
        );

        let started = Instant::now();
        let ack = self
            .gateway
            .create_order(&request)
            .await
            .map_err(|e| EngineError::Placement(e.to_string()))?;
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        {
            let mut state = self.state.lock().await;
            state.record.id = Some(ack.order_id.clone());
            state.record.requested_price = request.price;
            state.record.units = units;
            state.record.stop_loss_price = stop_loss;
            state.record.take_profit_price = take_profit;
            state.kind = Some(kind);
            state.transition(if ack.fill.is_some() {
                OrderStatus::Filled
            } else {
                OrderStatus::Pending
            });
        }

        let mut record = TradeRecord::from_ack(&ack, &request, ctx.side, sl_pips, execution_time_ms);
        self.journal.order_placed(&record);
        if ack.fill.is_some() {
            self.journal
                .order_executed(&mut record, ctx.instrument.pip_value);
        }

        Ok(ack)
    }

    /// Poll the broker at the configured interval until the order reaches a
    /// terminal state, returned as a tagged [`OrderOutcome`].
    ///
    /// A pending read is a no-op continuation. This is the suspend point
    /// the race coordinator competes against, so it must stay cancellable
    /// between iterations.
    pub async fn poll_until_terminal(&self) -> Result<OrderOutcome, EngineError> {
        loop {
            let order_id = {
                let state = self.state.lock().await;

                // already terminal: re-report the stored outcome, never
                // re-interrogate the broker
                if state.record.status.is_terminal() {
                    if let Some(snapshot) = &state.last_snapshot {
                        return Ok(match state.record.status {
                            OrderStatus::Filled => OrderOutcome::Filled(snapshot.clone()),
                            _ => OrderOutcome::Cancelled(snapshot.clone()),
                        });
                    }
                }

                state.record.id.clone().ok_or(EngineError::NoActiveOrder)?
            };

            let snapshot = self
                .gateway
                .fetch_order(&order_id)
                .await
                .map_err(|e| EngineError::Gateway(e.to_string()))?;

            match snapshot.status {
                OrderStatus::Pending => {
                    let mut state = self.state.lock().await;
                    state.transition(OrderStatus::Pending);
                    state.last_snapshot = Some(snapshot);
                }
                OrderStatus::Filled => {
                    let kind = {
                        let mut state = self.state.lock().await;
                        state.transition(OrderStatus::Filled);
                        state.last_snapshot = Some(snapshot.clone());
                        state.kind.unwrap_or(OrderKind::Limit)
                    };
                    info!("[order] {order_id} filled at {}", snapshot.price);
                    let mut record =
                        TradeRecord::from_snapshot(&snapshot, self.context.side, kind);
                    self.journal
                        .order_executed(&mut record, self.context.instrument.pip_value);
                    return Ok(OrderOutcome::Filled(snapshot));
                }
                OrderStatus::Cancelled => {
                    {
                        let mut state = self.state.lock().await;
                        state.transition(OrderStatus::Cancelled);
                        state.last_snapshot = Some(snapshot.clone());
                    }
                    self.journal
                        .order_cancelled(&order_id, "cancelled by broker");
                    return Ok(OrderOutcome::Cancelled(snapshot));
                }
                OrderStatus::None => {
                    // the broker never reports NONE for a created order
                    return Err(EngineError::Gateway(format!(
                        "order {order_id} reported no status"
                    )));
                }
            }

            tokio::time::sleep(self.context.poll_interval).await;
        }
    }

    /// Cancel the in-flight order.
    ///
    /// Fails with [`EngineError::NoActiveOrder`] (without touching the
    /// gateway) when nothing has been placed. A broker-side fill that lands
    /// just before the cancel call shows up as the gateway's rejection and
    /// is surfaced as-is.
    pub async fn cancel(&self) -> Result<(), EngineError> {
        let order_id = {
            let state = self.state.lock().await;
            state.record.id.clone().ok_or(EngineError::NoActiveOrder)?
        };

        match self.gateway.cancel_order(&order_id).await {
            Ok(()) => {
                self.state.lock().await.transition(OrderStatus::Cancelled);
                self.journal
                    .order_cancelled(&order_id, "cancelled by operator");
                Ok(())
            }
            Err(e) => {
                self.journal.record_error(&e.to_string(), Some(&order_id));
                Err(EngineError::Gateway(e.to_string()))
            }
        }
    }
}
