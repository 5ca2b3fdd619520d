//! 돌파 탐지.
//!
//! 가장 최근 캔들의 종가를 직전 `lookback`개 캔들의 최고가/최저가와 비교합니다.
//! 현재 캔들은 극값 계산에서 제외됩니다.

use triscan_core::{Candle, Side};

/// 마지막 종가가 직전 구간 범위를 돌파했는지 판정합니다.
///
/// - 종가 > 직전 최고가 → `Some(Side::Buy)`
/// - 종가 < 직전 최저가 → `Some(Side::Sell)`
/// - 그 외 (경계값 포함) → `None`
///
/// `lookback + 1`개 미만의 캔들에서는 판정할 수 없으므로 `None`을 반환합니다.
pub fn detect_breakout(candles: &[Candle], lookback: usize) -> Option<Side> {
    if lookback == 0 || candles.len() < lookback + 1 {
        return None;
    }

    let last = candles.last()?;
    let prior = &candles[candles.len() - 1 - lookback..candles.len() - 1];

    let prior_high = prior.iter().map(|c| c.high).max()?;
    let prior_low = prior.iter().map(|c| c.low).min()?;

    if last.close > prior_high {
        Some(Side::Buy)
    } else if last.close < prior_low {
        Some(Side::Sell)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use triscan_core::{Symbol, Timeframe};

    fn candle(i: usize, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(
            Symbol::forex("GBP", "USD"),
            Timeframe::M1,
            Utc.timestamp_opt(1_700_000_000 + (i as i64) * 60, 0).unwrap(),
            close,
            high,
            low,
            close,
            dec!(500),
        )
    }

    #[test]
    fn test_buy_breakout() {
        let mut candles: Vec<Candle> = (0..6)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();
        candles.push(candle(6, dec!(1.2530), dec!(1.2500), dec!(1.2525)));

        assert_eq!(detect_breakout(&candles, 5), Some(Side::Buy));
    }

    #[test]
    fn test_sell_breakout() {
        let mut candles: Vec<Candle> = (0..6)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();
        candles.push(candle(6, dec!(1.2500), dec!(1.2470), dec!(1.2475)));

        assert_eq!(detect_breakout(&candles, 5), Some(Side::Sell));
    }

    #[test]
    fn test_no_breakout_inside_range() {
        let candles: Vec<Candle> = (0..7)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();

        assert_eq!(detect_breakout(&candles, 5), None);
    }

    #[test]
    fn test_equal_close_is_not_breakout() {
        // 종가가 직전 최고가와 같으면 돌파가 아니다 (엄격 비교)
        let mut candles: Vec<Candle> = (0..6)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();
        candles.push(candle(6, dec!(1.2512), dec!(1.2500), dec!(1.2510)));

        assert_eq!(detect_breakout(&candles, 5), None);
    }

    #[test]
    fn test_current_candle_excluded_from_extrema() {
        // 마지막 캔들의 고가가 자기 자신을 포함한 최고가지만,
        // 자신을 제외한 직전 구간 최고가보다 종가가 낮으면 매수 신호가 아니다
        let mut candles: Vec<Candle> = (0..6)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();
        candles.push(candle(6, dec!(1.2550), dec!(1.2495), dec!(1.2505)));

        assert_eq!(detect_breakout(&candles, 5), None);
    }

    #[test]
    fn test_insufficient_candles() {
        let candles: Vec<Candle> = (0..5)
            .map(|i| candle(i, dec!(1.2510), dec!(1.2490), dec!(1.2500)))
            .collect();

        assert_eq!(detect_breakout(&candles, 5), None);
    }
}
