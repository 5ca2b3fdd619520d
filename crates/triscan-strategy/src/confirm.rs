//! 지표 확인 규칙.
//!
//! 돌파 방향이 마지막 인덱스의 지표 값 3종(RSI, MACD 대 시그널, Supertrend
//! 방향)과 모두 일치할 때만 신호를 확정합니다. 부수 효과가 없는 순수 함수입니다.

use crate::indicators::IndicatorFrame;
use rust_decimal_macros::dec;
use triscan_core::Side;

/// 돌파 방향이 지표 3종으로 확인되는지 판정합니다.
///
/// - 매수: RSI > 50, MACD > 시그널, 방향 = +1
/// - 매도: RSI < 50, MACD < 시그널, 방향 = -1
///
/// RSI가 아직 정의되지 않은 프레임은 확인 실패로 처리합니다.
pub fn confirm(breakout: Side, frame: &IndicatorFrame) -> bool {
    let Some(rsi) = frame.rsi else {
        return false;
    };

    match breakout {
        Side::Buy => {
            rsi > dec!(50) && frame.macd > frame.macd_signal && frame.trend_direction == 1
        }
        Side::Sell => {
            rsi < dec!(50) && frame.macd < frame.macd_signal && frame.trend_direction == -1
        }
    }
}
