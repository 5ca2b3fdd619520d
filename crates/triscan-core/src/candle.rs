//! OHLCV 캔들 타입.
//!
//! 이 모듈은 데이터 제공자가 반환하는 캔들 구조체를 정의합니다.
//! 캔들은 가져온 이후 불변이며, 지표 계산은 캔들을 수정하지 않습니다.

use crate::types::{Price, Quantity, Symbol, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들 데이터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// 심볼
    pub symbol: Symbol,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
    /// 캔들 종료 시간
    pub close_time: DateTime<Utc>,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        open_time: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        let close_time = open_time
            + chrono::Duration::from_std(timeframe.duration())
                .unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            symbol,
            timeframe,
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        }
    }

    /// 고가와 저가의 중간값을 반환합니다 (Supertrend 밴드 기준점).
    pub fn hl2(&self) -> Decimal {
        (self.high + self.low) / Decimal::from(2)
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle() {
        let symbol = Symbol::forex("EUR", "USD");
        let now = Utc::now();
        let candle = Candle::new(
            symbol,
            Timeframe::M1,
            now,
            dec!(1.1000),
            dec!(1.1020),
            dec!(1.0990),
            dec!(1.1010),
            dec!(1500),
        );

        assert!(candle.is_bullish());
        assert_eq!(candle.body_size(), dec!(0.0010));
        assert_eq!(candle.range(), dec!(0.0030));
        assert_eq!(candle.hl2(), dec!(1.1005));
        assert_eq!(candle.close_time, now + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_candle_bearish() {
        let symbol = Symbol::forex("USD", "JPY");
        let candle = Candle::new(
            symbol,
            Timeframe::M1,
            Utc::now(),
            dec!(155.20),
            dec!(155.25),
            dec!(154.90),
            dec!(155.00),
            dec!(800),
        );

        assert!(candle.is_bearish());
        assert!(!candle.is_bullish());
    }
}
