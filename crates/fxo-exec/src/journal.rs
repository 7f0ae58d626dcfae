//! Trade journal — structured session/order records plus a daily CSV
//! trade-history file.
//!
//! The journal is write-only telemetry: nothing in the engine reads it back
//! for control decisions. Console/file logging goes through `tracing`; the
//! CSV file is an append-only audit trail, one row per executed order.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxo_core::types::{FillDetail, OrderAck, OrderKind, OrderRequest, OrderSnapshot, Side};
use serde::Serialize;
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Trade record
// ---------------------------------------------------------------------------

/// Everything worth remembering about one order attempt.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub timestamp: String,
    pub order_id: String,
    pub instrument: String,
    pub kind: OrderKind,
    pub side: Side,
    pub units: i64,
    pub requested_price: Option<f64>,
    pub executed_price: Option<f64>,
    pub slippage_pips: Option<f64>,
    pub slippage_cost: Option<f64>,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub stop_loss_pips: f64,
    pub execution_time_ms: f64,
    pub spread_cost: f64,
    pub commission: f64,
    pub financing: f64,
    pub account_balance_after: f64,
    pub margin_required: f64,
    pub status: String,
    pub fill_reason: String,
}

impl TradeRecord {
    /// Build a record from a create-order ack.
    pub fn from_ack(
        ack: &OrderAck,
        request: &OrderRequest,
        side: Side,
        sl_pips: f64,
        execution_time_ms: f64,
    ) -> Self {
        let mut record = Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            order_id: ack.order_id.clone(),
            instrument: request.instrument.clone(),
            kind: request.kind,
            side,
            units: request.units,
            requested_price: request.price,
            executed_price: None,
            slippage_pips: None,
            slippage_cost: None,
            stop_loss_price: request.stop_loss,
            take_profit_price: request.take_profit,
            stop_loss_pips: sl_pips,
            execution_time_ms,
            spread_cost: 0.0,
            commission: 0.0,
            financing: 0.0,
            account_balance_after: 0.0,
            margin_required: 0.0,
            status: "PENDING".to_string(),
            fill_reason: String::new(),
        };
        if let Some(fill) = &ack.fill {
            record.apply_fill(fill);
        }
        record
    }

    /// Build a minimal record from a later status snapshot, for fills
    /// detected by the poll loop.
    pub fn from_snapshot(snapshot: &OrderSnapshot, side: Side, kind: OrderKind) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            order_id: snapshot.order_id.clone(),
            instrument: snapshot.instrument.clone(),
            kind,
            side,
            units: snapshot.units,
            requested_price: Some(snapshot.price),
            executed_price: Some(snapshot.price),
            slippage_pips: None,
            slippage_cost: None,
            stop_loss_price: snapshot.stop_loss_price,
            take_profit_price: snapshot.take_profit_price,
            stop_loss_pips: 0.0,
            execution_time_ms: 0.0,
            spread_cost: 0.0,
            commission: 0.0,
            financing: 0.0,
            account_balance_after: 0.0,
            margin_required: 0.0,
            status: "FILLED".to_string(),
            fill_reason: "LIMIT_ORDER".to_string(),
        }
    }

    /// Merge broker fill details into the record.
    pub fn apply_fill(&mut self, fill: &FillDetail) {
        self.executed_price = Some(fill.executed_price);
        self.spread_cost = fill.half_spread_cost;
        self.commission = fill.commission;
        self.financing = fill.financing;
        self.account_balance_after = fill.account_balance;
        self.margin_required = fill.margin_required;
        self.status = "FILLED".to_string();
        self.fill_reason = fill.reason.clone();
    }

    /// Slippage between requested and executed price, in pips and in cost.
    /// No-op unless both prices are known.
    pub fn compute_slippage(&mut self, pip_value: f64) {
        if let (Some(requested), Some(executed)) = (self.requested_price, self.executed_price) {
            let diff = (executed - requested).abs();
            self.slippage_pips = Some(diff / pip_value);
            self.slippage_cost = Some(diff * self.units.unsigned_abs() as f64);
        }
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

const CSV_HEADERS: [&str; 20] = [
    "timestamp",
    "order_id",
    "instrument",
    "order_type",
    "side",
    "units",
    "requested_price",
    "executed_price",
    "slippage_pips",
    "slippage_cost",
    "stop_loss_price",
    "take_profit_price",
    "stop_loss_pips",
    "execution_time_ms",
    "spread_cost",
    "commission",
    "financing",
    "account_balance_after",
    "margin_required",
    "fill_reason",
];

/// The logging collaborator: emits structured records through `tracing` and
/// appends executed trades to a daily CSV history file.
pub struct TradeJournal {
    csv_path: PathBuf,
}

impl TradeJournal {
    /// Create the journal, ensuring `log_dir` and the day's CSV header
    /// exist.
    pub fn new(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("cannot create log dir {}", log_dir.display()))?;

        let file_name = format!("trade_history_{}.csv", chrono::Local::now().format("%Y%m%d"));
        let csv_path = log_dir.join(file_name);

        if !csv_path.exists() {
            let mut writer = csv::Writer::from_path(&csv_path)
                .with_context(|| format!("cannot create {}", csv_path.display()))?;
            writer.write_record(CSV_HEADERS)?;
            writer.flush()?;
        }

        Ok(Self { csv_path })
    }

    pub fn session_start(&self, balance: f64, instrument: &str, side: Side, sl_pips: f64) {
        info!(
            "[session] started — balance=${balance:.2}, instrument={instrument}, \
             side={side}, sl={sl_pips} pips"
        );
    }

    pub fn session_end(&self, reason: &str) {
        info!("[session] ended — {reason}");
    }

    pub fn order_placed(&self, record: &TradeRecord) {
        info!(
            "[order] placed {} {} — id={}, units={}, tp={}, sl={}, took {:.2}ms",
            record.kind.as_wire_str(),
            record.instrument,
            record.order_id,
            record.units,
            record.take_profit_price,
            record.stop_loss_price,
            record.execution_time_ms,
        );
        if let Some(price) = record.requested_price {
            info!("[order] requested price {price}");
        }
    }

    /// Log an execution with its slippage/cost breakdown and append the row
    /// to the CSV history.
    pub fn order_executed(&self, record: &mut TradeRecord, pip_value: f64) {
        record.compute_slippage(pip_value);

        info!(
            "[order] executed — id={}, price={:?}, balance=${:.2}, margin=${:.2}",
            record.order_id,
            record.executed_price,
            record.account_balance_after,
            record.margin_required,
        );
        if let (Some(pips), Some(cost)) = (record.slippage_pips, record.slippage_cost) {
            info!("[order] slippage {pips:.2} pips (${cost:.2})");
        }
        info!(
            "[order] costs — spread=${:.2}, commission=${:.2}, financing=${:.2}",
            record.spread_cost, record.commission, record.financing,
        );

        if let Err(e) = self.append_csv(record) {
            error!("[journal] failed to write trade history: {e}");
        }
    }

    pub fn order_cancelled(&self, order_id: &str, reason: &str) {
        warn!("[order] cancelled — id={order_id}, reason={reason}");
    }

    pub fn record_error(&self, message: &str, order_id: Option<&str>) {
        match order_id {
            Some(id) => error!("[order] error — id={id}: {message}"),
            None => error!("[order] error — {message}"),
        }
    }

    fn append_csv(&self, record: &TradeRecord) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.csv_path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        writer.write_record([
            record.timestamp.clone(),
            record.order_id.clone(),
            record.instrument.clone(),
            record.kind.as_wire_str().to_string(),
            record.side.to_string(),
            record.units.to_string(),
            opt(record.requested_price),
            opt(record.executed_price),
            opt(record.slippage_pips),
            opt(record.slippage_cost),
            record.stop_loss_price.to_string(),
            record.take_profit_price.to_string(),
            record.stop_loss_pips.to_string(),
            record.execution_time_ms.to_string(),
            record.spread_cost.to_string(),
            record.commission.to_string(),
            record.financing.to_string(),
            record.account_balance_after.to_string(),
            record.margin_required.to_string(),
            record.fill_reason.clone(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}
