//! 삼각수렴 돌파 신호 탐지 엔진.
//!
//! 이 크레이트가 제공하는 기능:
//! - 캔들 윈도우 기반 기술적 지표 계산 (RSI, MACD, ATR, Supertrend 방향)
//! - 고가/저가 엔벨로프 기울기를 통한 삼각수렴 패턴 분류
//! - 직전 구간 고점/저점 대비 돌파 탐지
//! - 지표 3종 동시 확인 규칙
//! - 위 단계를 묶는 `SignalEngine` 파사드
//!
//! # 예제
//!
//! ```rust,ignore
//! use triscan_strategy::{SignalConfig, SignalEngine};
//!
//! let engine = SignalEngine::new(SignalConfig::default());
//! if let Some(signal) = engine.evaluate(&candles) {
//!     println!("{} {} @ {}", signal.side, signal.symbol, signal.price);
//! }
//! ```

pub mod breakout;
pub mod confirm;
pub mod engine;
pub mod indicators;
pub mod pattern;

// 주요 타입 재내보내기
pub use breakout::detect_breakout;
pub use confirm::confirm;
pub use engine::{SignalConfig, SignalEngine};
pub use indicators::{IndicatorConfig, IndicatorFrame, IndicatorSet, MacdSeries};
pub use pattern::{detect_triangle, envelope_slopes, SLOPE_EPSILON};
