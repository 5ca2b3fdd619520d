//! 데이터 Provider 모듈.
//!
//! 외부 소스에서 캔들 시리즈를 가져오는 Provider들을 정의합니다.
//!
//! ## Yahoo Finance
//! - `YahooProvider`: chart API v8 클라이언트
//! - 외환(`EURUSD=X`), 암호화폐, 주식 심볼 지원

use crate::error::Result;
use async_trait::async_trait;
use triscan_core::{Candle, Symbol, Timeframe};

pub mod yahoo;

pub use yahoo::YahooProvider;

/// 캔들 시리즈 제공자 trait.
///
/// 구현체는 시간 오름차순으로 정렬된 캔들을 반환해야 하며, 실패는
/// `DataError`로 보고합니다. 호출자는 실패를 "해당 자산 건너뛰기"로
/// 처리합니다.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// 최근 `count`개의 캔들을 시간 오름차순으로 가져옵니다.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>>;

    /// Provider 이름을 반환합니다.
    fn name(&self) -> &str;
}
