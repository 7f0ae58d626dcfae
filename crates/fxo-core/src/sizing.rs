//! Position-sizing and TP/SL price arithmetic.
//!
//! Pure functions consumed by the order lifecycle machine. All prices are
//! rounded to the instrument's configured precision before they are sent to
//! the broker.

use crate::types::Side;

/// Round a price to `precision` decimal places.
pub fn round_to_precision(price: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (price * factor).round() / factor
}

/// Signed position size in units.
///
/// Risks `risk_pct` percent of `account_size` over a stop-loss distance of
/// `sl_pips`. JPY-quoted instruments carry their pip weight in the second
/// decimal place, so the pip value is scaled down by 100 for them. Short
/// positions get negative units.
pub fn position_size(
    account_size: f64,
    symbol: &str,
    risk_pct: f64,
    side: Side,
    sl_pips: f64,
    pip_value: f64,
) -> i64 {
    let pip_value = if symbol.contains("JPY") {
        pip_value / 100.0
    } else {
        pip_value
    };

    let risk_amount = account_size * (risk_pct / 100.0);
    let mut units = (risk_amount / (sl_pips * pip_value)).round() as i64;

    if side == Side::Short {
        units = -units;
    }
    units
}

/// Take-profit and stop-loss prices around `current_price`.
///
/// The stop sits `sl_pips` away against the position; the target sits
/// `sl_pips * risk_reward` away with it. Both are rounded to `precision`.
pub fn tp_sl_prices(
    side: Side,
    current_price: f64,
    sl_pips: f64,
    pip_value: f64,
    precision: u32,
    risk_reward: f64,
) -> (f64, f64) {
    let sl_dist = sl_pips * pip_value;
    let tp_dist = sl_pips * risk_reward * pip_value;

    let (tp, sl) = match side {
        Side::Long => (current_price + tp_dist, current_price - sl_dist),
        Side::Short => (current_price - tp_dist, current_price + sl_dist),
    };

    (
        round_to_precision(tp, precision),
        round_to_precision(sl, precision),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_size_long_short() {
        // 10_000 account, 1% risk, 20 pip stop, 0.0001 pip value → 50_000 units
        let long = position_size(10_000.0, "EUR_USD", 1.0, Side::Long, 20.0, 0.0001);
        assert_eq!(long, 50_000);

        let short = position_size(10_000.0, "EUR_USD", 1.0, Side::Short, 20.0, 0.0001);
        assert_eq!(short, -50_000);
    }

    #[test]
    fn position_size_jpy_scaling() {
        // JPY pairs quote pips in the second decimal: pip_value / 100
        let units = position_size(10_000.0, "USD_JPY", 1.0, Side::Long, 20.0, 0.01);
        assert_eq!(units, 50_000);
    }

    #[test]
    fn tp_sl_long() {
        let (tp, sl) = tp_sl_prices(Side::Long, 1.10000, 20.0, 0.0001, 5, 1.0);
        assert_eq!(tp, 1.10200);
        assert_eq!(sl, 1.09800);
    }

    #[test]
    fn tp_sl_short() {
        let (tp, sl) = tp_sl_prices(Side::Short, 1.10000, 20.0, 0.0001, 5, 1.0);
        assert_eq!(tp, 1.09800);
        assert_eq!(sl, 1.10200);
    }

    #[test]
    fn tp_scales_with_risk_reward() {
        let (tp, sl) = tp_sl_prices(Side::Long, 1.10000, 20.0, 0.0001, 5, 2.0);
        assert_eq!(tp, 1.10400);
        assert_eq!(sl, 1.09800);
    }

    #[test]
    fn rounding_to_precision() {
        assert_eq!(round_to_precision(1.234567, 5), 1.23457);
        assert_eq!(round_to_precision(151.9612345, 3), 151.961);
    }
}
