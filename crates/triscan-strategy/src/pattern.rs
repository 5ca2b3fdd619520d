//! 삼각수렴 패턴 분류.
//!
//! 최근 캔들 윈도우의 고가/저가 각각에 대해 인덱스(0..N-1)를 설명 변수로 하는
//! 최소제곱 직선을 적합하고, 두 기울기의 부호와 크기로 패턴을 분류합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use triscan_core::{Candle, TrianglePattern};

/// 기울기를 0으로 간주하는 임계값.
pub const SLOPE_EPSILON: Decimal = dec!(0.00005);

/// 값 시리즈에 대한 최소제곱 기울기.
///
/// 설명 변수는 인덱스 0..N-1입니다. 2개 미만이면 `None`을 반환합니다.
fn ols_slope(values: &[Decimal]) -> Option<Decimal> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let count = Decimal::from(n);
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_x2 = Decimal::ZERO;

    for (i, &y) in values.iter().enumerate() {
        let x = Decimal::from(i);
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = count * sum_x2 - sum_x * sum_x;
    if denominator.is_zero() {
        return None;
    }

    Some((count * sum_xy - sum_x * sum_y) / denominator)
}

/// 윈도우의 고가/저가 엔벨로프 기울기를 반환합니다.
///
/// 반환값은 `(high_slope, low_slope)`이며, 캔들이 2개 미만이면 `None`입니다.
pub fn envelope_slopes(candles: &[Candle]) -> Option<(Decimal, Decimal)> {
    let highs: Vec<Decimal> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<Decimal> = candles.iter().map(|c| c.low).collect();

    let high_slope = ols_slope(&highs)?;
    let low_slope = ols_slope(&lows)?;
    Some((high_slope, low_slope))
}

/// 윈도우 마지막 `consolidation` 캔들에서 삼각수렴 패턴을 탐지합니다.
///
/// 분류 조건은 순서대로 평가되며 첫 번째로 일치하는 패턴이 반환됩니다.
/// 정확히 임계값 위에 있는 기울기는 어느 조건도 만족하지 않습니다.
pub fn detect_triangle(candles: &[Candle], consolidation: usize) -> Option<TrianglePattern> {
    let start = candles.len().saturating_sub(consolidation);
    let recent = &candles[start..];
    let (high_slope, low_slope) = envelope_slopes(recent)?;

    classify(high_slope, low_slope)
}

/// 엔벨로프 기울기 쌍을 패턴으로 분류합니다.
///
/// 평가 순서가 의미를 가지므로 변경하면 안 됩니다 (Descending이 Symmetrical보다
/// 먼저 평가됩니다).
fn classify(high_slope: Decimal, low_slope: Decimal) -> Option<TrianglePattern> {
    if high_slope.abs() < SLOPE_EPSILON && low_slope > SLOPE_EPSILON {
        Some(TrianglePattern::Ascending)
    } else if low_slope.abs() < SLOPE_EPSILON && high_slope < -SLOPE_EPSILON {
        Some(TrianglePattern::Descending)
    } else if high_slope < -SLOPE_EPSILON && low_slope > SLOPE_EPSILON {
        Some(TrianglePattern::Symmetrical)
    } else {
        None
    }
}
