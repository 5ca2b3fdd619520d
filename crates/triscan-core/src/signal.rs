//! 패턴 분류 및 확정 신호 타입.
//!
//! 이 모듈은 신호 탐지 엔진이 생성하는 타입을 정의합니다:
//! - `Side` - 매매 방향 (매수/매도)
//! - `TrianglePattern` - 삼각수렴 패턴 분류
//! - `ConfirmedSignal` - 모든 확인 조건을 통과한 돌파 신호

use crate::types::{Price, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 매매 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 삼각수렴 패턴 분류.
///
/// 최근 고가/저가 엔벨로프의 기울기에 따라 분류합니다.
/// 패턴 없음은 `Option::None`으로 표현합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrianglePattern {
    /// 상승 삼각형 - 평평한 고점, 상승하는 저점
    Ascending,
    /// 하락 삼각형 - 하락하는 고점, 평평한 저점
    Descending,
    /// 대칭 삼각형 - 하락하는 고점, 상승하는 저점
    Symmetrical,
}

impl std::fmt::Display for TrianglePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrianglePattern::Ascending => write!(f, "Ascending"),
            TrianglePattern::Descending => write!(f, "Descending"),
            TrianglePattern::Symmetrical => write!(f, "Symmetrical"),
        }
    }
}

/// 패턴, 돌파, 지표 확인을 모두 통과한 확정 신호.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedSignal {
    /// 고유 신호 ID
    pub id: Uuid,
    /// 심볼
    pub symbol: Symbol,
    /// 신호 방향
    pub side: Side,
    /// 탐지된 삼각수렴 패턴
    pub pattern: TrianglePattern,
    /// 신호 발생 시점 가격 (마지막 종가)
    pub price: Price,
    /// 신호 생성 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl ConfirmedSignal {
    /// 새 확정 신호를 생성합니다.
    pub fn new(
        symbol: Symbol,
        side: Side,
        pattern: TrianglePattern,
        price: Price,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            side,
            pattern,
            price,
            timestamp,
        }
    }

    /// 매수 신호인지 확인합니다.
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }
}
