//! 기술적 지표 계산 함수.
//!
//! 이 모듈은 캔들 윈도우 전체에 대해 인덱스 정렬된 지표 시리즈를 계산합니다.
//! 모든 함수는 입력과 같은 길이의 시리즈를 반환하며, 데이터가 부족한 앞부분
//! 인덱스는 `None`으로 채웁니다. 입력 캔들은 수정하지 않습니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use triscan_core::Candle;

/// 지표 계산 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// RSI 기간
    pub rsi_period: usize,
    /// MACD 단기 EMA 기간
    pub macd_fast: usize,
    /// MACD 장기 EMA 기간
    pub macd_slow: usize,
    /// MACD 시그널 EMA 기간
    pub macd_signal: usize,
    /// Supertrend ATR 기간
    pub supertrend_period: usize,
    /// Supertrend ATR 배수
    pub supertrend_multiplier: Decimal,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 10,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            supertrend_period: 5,
            supertrend_multiplier: dec!(2),
        }
    }
}

/// RSI (Relative Strength Index) 시리즈 계산.
///
/// Wilder 평활화를 사용합니다: 처음 `period`개의 가격 변화로 평균을 시드하고
/// 이후 `avg = (avg * (p - 1) + x) / p` 점화식으로 갱신합니다.
/// 처음 `period`개 인덱스는 정의되지 않으므로 `None`입니다.
///
/// 손실 평균이 0인 구간은 100으로 포화되고, 변화가 전혀 없는 구간은
/// 중립값 50을 반환합니다.
pub fn rsi_series(closes: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let p = Decimal::from(period);
    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;

    // 초기 평균 계산
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > Decimal::ZERO {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let mut avg_gain = gains / p;
    let mut avg_loss = losses / p;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    // Wilder 방식으로 나머지 기간 계산
    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, change.abs())
        };

        avg_gain = (avg_gain * (p - Decimal::ONE) + gain) / p;
        avg_loss = (avg_loss * (p - Decimal::ONE) + loss) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

/// 평균 이익/손실에서 RSI 값을 계산합니다.
fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        if avg_gain.is_zero() {
            // 완전히 평평한 윈도우는 중립
            return dec!(50);
        }
        return dec!(100);
    }

    let rs = avg_gain / avg_loss;
    dec!(100) - (dec!(100) / (Decimal::ONE + rs))
}

/// EMA (Exponential Moving Average) 시리즈 계산.
///
/// `alpha = 2 / (span + 1)`이며, 첫 번째 값으로 시드합니다.
/// 따라서 모든 인덱스에서 값이 정의됩니다.
pub fn ema_series(values: &[Decimal], span: usize) -> Vec<Decimal> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = dec!(2) / Decimal::from(span + 1);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &value in &values[1..] {
        ema = (value - ema) * alpha + ema;
        out.push(ema);
    }

    out
}

/// MACD 계산 결과 시리즈.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    /// MACD 선 (단기 EMA - 장기 EMA)
    pub macd: Vec<Decimal>,
    /// 시그널 선 (MACD의 EMA)
    pub signal: Vec<Decimal>,
}

/// MACD (Moving Average Convergence Divergence) 시리즈 계산.
///
/// 단기/장기 EMA 모두 첫 번째 종가로 시드하므로 모든 인덱스에서 정의됩니다.
pub fn macd_series(
    closes: &[Decimal],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> MacdSeries {
    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    let macd: Vec<Decimal> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_series(&macd, signal_span);

    MacdSeries { macd, signal }
}

/// ATR (Average True Range) 시리즈 계산.
///
/// True Range는 직전 종가를 기준으로 하며, 처음 `period`개 TR의 단순 평균으로
/// 시드한 뒤 Wilder 점화식으로 갱신합니다. 처음 `period`개 인덱스는 `None`입니다.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return out;
    }

    let p = Decimal::from(period);
    let true_range = |i: usize| -> Decimal {
        let tr1 = candles[i].high - candles[i].low;
        let tr2 = (candles[i].high - candles[i - 1].close).abs();
        let tr3 = (candles[i].low - candles[i - 1].close).abs();
        tr1.max(tr2).max(tr3)
    };

    let mut sum = Decimal::ZERO;
    for i in 1..=period {
        sum += true_range(i);
    }

    let mut atr = sum / p;
    out[period] = Some(atr);

    for i in (period + 1)..candles.len() {
        atr = (atr * (p - Decimal::ONE) + true_range(i)) / p;
        out[i] = Some(atr);
    }

    out
}

/// Supertrend 방향 시리즈 계산.
///
/// 밴드는 `hl2 ± multiplier × ATR(period)`입니다. 종가가 *직전* 캔들의 상단
/// 밴드를 넘으면 +1로, 하단 밴드 아래로 내려가면 -1로 전환되고, 그 외에는
/// 직전 방향을 유지합니다.
///
/// 인덱스 0의 방향과 ATR 워밍업 구간(직전 밴드 미정의)은 +1로 시드합니다.
/// 전환 조건을 평가할 수 없는 구간에서는 방향이 유지됩니다.
pub fn supertrend_directions(
    candles: &[Candle],
    period: usize,
    multiplier: Decimal,
) -> Vec<i8> {
    let atr = atr_series(candles, period);
    let mut directions = vec![1i8; candles.len()];
    let mut current = 1i8;

    for i in 1..candles.len() {
        if let Some(prev_atr) = atr[i - 1] {
            let prev_mid = candles[i - 1].hl2();
            let upper = prev_mid + multiplier * prev_atr;
            let lower = prev_mid - multiplier * prev_atr;

            if candles[i].close > upper {
                current = 1;
            } else if candles[i].close < lower {
                current = -1;
            }
        }
        directions[i] = current;
    }

    directions
}

/// 캔들 윈도우와 인덱스 정렬된 지표 묶음.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    /// RSI 시리즈 (처음 `rsi_period`개는 None)
    pub rsi: Vec<Option<Decimal>>,
    /// MACD 선
    pub macd: Vec<Decimal>,
    /// MACD 시그널 선
    pub macd_signal: Vec<Decimal>,
    /// Supertrend 방향 (+1 / -1)
    pub trend_direction: Vec<i8>,
}

/// 가장 최근 인덱스의 지표 값 묶음.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorFrame {
    /// RSI 값 (정의되지 않은 경우 None)
    pub rsi: Option<Decimal>,
    /// MACD 값
    pub macd: Decimal,
    /// MACD 시그널 값
    pub macd_signal: Decimal,
    /// Supertrend 방향
    pub trend_direction: i8,
}

impl IndicatorSet {
    /// 캔들 윈도우에서 전체 지표 묶음을 계산합니다.
    pub fn compute(candles: &[Candle], config: &IndicatorConfig) -> Self {
        let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();

        let rsi = rsi_series(&closes, config.rsi_period);
        let MacdSeries { macd, signal } = macd_series(
            &closes,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        );
        let trend_direction =
            supertrend_directions(candles, config.supertrend_period, config.supertrend_multiplier);

        Self {
            rsi,
            macd,
            macd_signal: signal,
            trend_direction,
        }
    }

    /// 시리즈 길이를 반환합니다.
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    /// 시리즈가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    /// 가장 최근 인덱스의 지표 값을 반환합니다.
    pub fn last_frame(&self) -> Option<IndicatorFrame> {
        let idx = self.len().checked_sub(1)?;
        Some(IndicatorFrame {
            rsi: self.rsi.get(idx).copied().flatten(),
            macd: self.macd[idx],
            macd_signal: self.macd_signal[idx],
            trend_direction: self.trend_direction[idx],
        })
    }
}
