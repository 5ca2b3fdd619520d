//! 신호 탐지 파이프라인 파사드.
//!
//! 캔들 윈도우 하나를 받아 지표 계산 → 패턴 분류 → 돌파 탐지 → 지표 확인을
//! 순서대로 수행하고, 모든 조건이 일치할 때만 확정 신호를 반환합니다.

use crate::breakout::detect_breakout;
use crate::confirm::confirm;
use crate::indicators::{IndicatorConfig, IndicatorSet};
use crate::pattern::detect_triangle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use triscan_core::{Candle, ConfirmedSignal};

/// 신호 탐지 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// 평가에 필요한 최소 캔들 수 (기본값: 30)
    #[serde(default = "default_min_window")]
    pub min_window: usize,

    /// RSI 기간 (기본값: 10)
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// MACD 단기 EMA 기간 (기본값: 12)
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// MACD 장기 EMA 기간 (기본값: 26)
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    /// MACD 시그널 EMA 기간 (기본값: 9)
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Supertrend ATR 기간 (기본값: 5)
    #[serde(default = "default_supertrend_period")]
    pub supertrend_period: usize,

    /// Supertrend ATR 배수 (기본값: 2)
    #[serde(default = "default_supertrend_multiplier")]
    pub supertrend_multiplier: Decimal,

    /// 패턴 분류에 사용할 수렴 구간 캔들 수 (기본값: 20)
    #[serde(default = "default_consolidation_candles")]
    pub consolidation_candles: usize,

    /// 돌파 판정 직전 구간 캔들 수 (기본값: 5)
    #[serde(default = "default_breakout_lookback")]
    pub breakout_lookback: usize,
}

fn default_min_window() -> usize {
    30
}
fn default_rsi_period() -> usize {
    10
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}
fn default_supertrend_period() -> usize {
    5
}
fn default_supertrend_multiplier() -> Decimal {
    dec!(2)
}
fn default_consolidation_candles() -> usize {
    20
}
fn default_breakout_lookback() -> usize {
    5
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_window: 30,
            rsi_period: 10,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            supertrend_period: 5,
            supertrend_multiplier: dec!(2),
            consolidation_candles: 20,
            breakout_lookback: 5,
        }
    }
}

impl SignalConfig {
    /// 지표 계산 설정을 반환합니다.
    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: self.rsi_period,
            macd_fast: self.macd_fast,
            macd_slow: self.macd_slow,
            macd_signal: self.macd_signal,
            supertrend_period: self.supertrend_period,
            supertrend_multiplier: self.supertrend_multiplier,
        }
    }
}

/// 신호 탐지 엔진.
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    /// 설정을 반환합니다.
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// 캔들 윈도우 하나를 평가하여 확정 신호를 반환합니다.
    ///
    /// 최소 캔들 수 미만이면 지표 계산 없이 즉시 `None`을 반환합니다.
    pub fn evaluate(&self, candles: &[Candle]) -> Option<ConfirmedSignal> {
        if candles.len() < self.config.min_window {
            trace!(
                candles = candles.len(),
                min_window = self.config.min_window,
                "윈도우가 짧아 평가 생략"
            );
            return None;
        }

        let indicators = IndicatorSet::compute(candles, &self.config.indicator_config());

        let pattern = detect_triangle(candles, self.config.consolidation_candles)?;
        let breakout = detect_breakout(candles, self.config.breakout_lookback)?;
        let frame = indicators.last_frame()?;

        if !confirm(breakout, &frame) {
            trace!(
                pattern = %pattern,
                breakout = %breakout,
                "지표 확인 실패"
            );
            return None;
        }

        let last = candles.last()?;
        debug!(
            symbol = %last.symbol,
            side = %breakout,
            pattern = %pattern,
            price = %last.close,
            "확정 신호 생성"
        );

        Some(ConfirmedSignal::new(
            last.symbol.clone(),
            breakout,
            pattern,
            last.close,
            last.close_time,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use triscan_core::{Side, Symbol, Timeframe, TrianglePattern};

    fn candle(i: usize, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(
            Symbol::forex("EUR", "USD"),
            Timeframe::M1,
            Utc.timestamp_opt(1_700_000_000 + (i as i64) * 60, 0).unwrap(),
            open,
            high,
            low,
            close,
            dec!(1000),
        )
    }

    /// 상승 삼각형(평평한 고점 1.0100, 상승하는 저점)을 형성하다가 마지막
    /// 캔들이 고점을 돌파하는 30캔들 윈도우.
    ///
    /// 종가가 꾸준히 상승하므로 RSI는 100, MACD는 시그널 위, Supertrend는
    /// 시드 방향 +1을 유지합니다.
    fn ascending_breakout_window() -> Vec<Candle> {
        let mut candles = Vec::new();
        for i in 0..29usize {
            let low = dec!(1.0) + Decimal::from(i) * dec!(0.0003);
            let close = low + dec!(0.0005);
            let open = close - dec!(0.0001);
            candles.push(candle(i, open, dec!(1.0100), low, close));
        }
        // 마지막 캔들: 종가가 직전 5개 고점(1.0100)을 상향 돌파
        candles.push(candle(29, dec!(1.0104), dec!(1.0105), dec!(1.0087), dec!(1.0105)));
        candles
    }

    #[test]
    fn test_short_window_yields_nothing() {
        let engine = SignalEngine::new(SignalConfig::default());
        let candles = ascending_breakout_window();

        assert!(engine.evaluate(&candles[..29]).is_none());
        assert!(engine.evaluate(&[]).is_none());
    }

    #[test]
    fn test_full_pipeline_buy_signal() {
        let engine = SignalEngine::new(SignalConfig::default());
        let candles = ascending_breakout_window();

        let signal = engine.evaluate(&candles).expect("signal expected");
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.pattern, TrianglePattern::Ascending);
        assert_eq!(signal.price, dec!(1.0105));
        assert_eq!(signal.timestamp, candles.last().unwrap().close_time);
    }

    /// 하락하는 고점/평평한 저점(하락 삼각형)을 형성하다가 마지막 종가가
    /// 직전 5개 고점을 상향 돌파하는 30캔들 윈도우.
    fn descending_breakout_window() -> Vec<Candle> {
        let mut candles = Vec::new();
        for i in 0..29usize {
            let high = dec!(1.0100) - Decimal::from(i) * dec!(0.0002);
            let close = dec!(1.00001) + Decimal::from(i) * dec!(0.00005);
            candles.push(candle(i, close - dec!(0.00001), high, dec!(1.0), close));
        }
        // 직전 5개 고점 최대치는 1.0052 -> 종가 1.0055로 돌파
        candles.push(candle(29, dec!(1.0054), dec!(1.0055), dec!(1.0), dec!(1.0055)));
        candles
    }

    #[test]
    fn test_full_pipeline_descending_buy_signal() {
        let engine = SignalEngine::new(SignalConfig::default());
        let candles = descending_breakout_window();

        let signal = engine.evaluate(&candles).expect("signal expected");
        assert_eq!(signal.side, Side::Buy);
        assert_eq!(signal.pattern, TrianglePattern::Descending);
        assert_eq!(signal.price, dec!(1.0055));
    }

    #[test]
    fn test_trending_window_yields_nothing() {
        // 평행 상승 채널: 돌파는 있어도 수렴 패턴이 없다
        let engine = SignalEngine::new(SignalConfig::default());
        let candles: Vec<Candle> = (0..30usize)
            .map(|i| {
                let base = dec!(1.0) + Decimal::from(i) * dec!(0.0010);
                candle(i, base, base + dec!(0.0005), base - dec!(0.0005), base + dec!(0.0004))
            })
            .collect();

        assert!(engine.evaluate(&candles).is_none());
    }

    #[test]
    fn test_input_window_not_mutated() {
        let engine = SignalEngine::new(SignalConfig::default());
        let candles = ascending_breakout_window();
        let before: Vec<Decimal> = candles.iter().map(|c| c.close).collect();

        let _ = engine.evaluate(&candles);

        let after: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_config_defaults() {
        let config: SignalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.min_window, 30);
        assert_eq!(config.rsi_period, 10);
        assert_eq!(config.macd_slow, 26);
        assert_eq!(config.consolidation_candles, 20);
        assert_eq!(config.breakout_lookback, 5);
        assert_eq!(config.supertrend_multiplier, dec!(2));
    }
}
