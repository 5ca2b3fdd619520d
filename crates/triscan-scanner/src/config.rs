//! 환경변수 기반 설정 모듈.
//!
//! 모든 설정은 프로세스 시작 시 한 번 읽히며 이후 변경되지 않습니다.
//! 필수 항목(텔레그램 자격증명)이 없으면 기동을 거부합니다.

use crate::error::{Result, ScannerError};
use rust_decimal::Decimal;
use std::time::Duration;
use triscan_core::{MarketType, Symbol, Timeframe};
use triscan_strategy::SignalConfig;

/// 기본 감시 대상 외환 쌍.
const DEFAULT_ASSETS: &[&str] = &[
    "EUR/USD", "AUD/CHF", "GBP/CHF", "EUR/CAD", "AUD/CAD", "USD/CHF", "CAD/CHF", "AUD/JPY",
    "CAD/JPY", "EUR/JPY", "USD/JPY", "GBP/USD", "EUR/GBP", "GBP/JPY", "GBP/AUD",
];

/// Scanner 전체 설정
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// 텔레그램 봇 토큰
    pub telegram_bot_token: String,
    /// 텔레그램 채팅 ID
    pub telegram_chat_id: String,
    /// 감시 대상 심볼 목록 (순서 고정)
    pub assets: Vec<Symbol>,
    /// 캔들 타임프레임
    pub timeframe: Timeframe,
    /// 자산별 요청 캔들 수
    pub candle_count: usize,
    /// 스캔 루프 설정
    pub scan: ScanLoopConfig,
    /// 신호 탐지 설정
    pub signal: SignalConfig,
    /// 헬스 체크 설정
    pub health: HealthConfig,
}

/// 스캔 루프 설정
#[derive(Debug, Clone)]
pub struct ScanLoopConfig {
    /// 폴링 주기 (초)
    pub interval_secs: u64,
    /// 거래 시작 시각 (UTC, 포함)
    pub trading_start_hour: u32,
    /// 거래 종료 시각 (UTC, 미포함)
    pub trading_end_hour: u32,
    /// 자산 간 요청 딜레이 (밀리초)
    pub fetch_delay_ms: u64,
    /// 자산별 알림 쿨다운 (초)
    pub cooldown_secs: u64,
}

/// 헬스 체크 설정
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// 헬스 체크 서버 활성화 여부
    pub enabled: bool,
    /// 리스닝 포트
    pub port: u16,
}

impl ScannerConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN").map_err(|_| {
            ScannerError::Config("TELEGRAM_BOT_TOKEN 환경변수가 설정되지 않았습니다".to_string())
        })?;
        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID").map_err(|_| {
            ScannerError::Config("TELEGRAM_CHAT_ID 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let assets = parse_assets(&std::env::var("SCAN_ASSETS").unwrap_or_default())?;

        let timeframe: Timeframe = std::env::var("CANDLE_INTERVAL")
            .unwrap_or_else(|_| "1m".to_string())
            .parse()
            .map_err(ScannerError::Config)?;

        let scan = ScanLoopConfig {
            interval_secs: env_var_parse("SCAN_INTERVAL_SECS", 60),
            trading_start_hour: env_var_parse("TRADING_START_HOUR", 10),
            trading_end_hour: env_var_parse("TRADING_END_HOUR", 22),
            fetch_delay_ms: env_var_parse("FETCH_DELAY_MS", 2000),
            cooldown_secs: env_var_parse("COOLDOWN_SECS", 900),
        };

        if scan.trading_start_hour >= 24 || scan.trading_end_hour > 24 {
            return Err(ScannerError::Config(format!(
                "잘못된 거래 시간 범위: {}-{}",
                scan.trading_start_hour, scan.trading_end_hour
            )));
        }

        let signal = SignalConfig {
            rsi_period: env_var_parse("RSI_PERIOD", 10),
            macd_fast: env_var_parse("MACD_FAST", 12),
            macd_slow: env_var_parse("MACD_SLOW", 26),
            macd_signal: env_var_parse("MACD_SIGNAL", 9),
            supertrend_period: env_var_parse("SUPERTREND_PERIOD", 5),
            supertrend_multiplier: env_var_parse("SUPERTREND_MULTIPLIER", Decimal::from(2)),
            consolidation_candles: env_var_parse("MIN_CONSOLIDATION_CANDLES", 20),
            breakout_lookback: env_var_parse("BREAKOUT_LOOKBACK", 5),
            ..SignalConfig::default()
        };

        let health = HealthConfig {
            enabled: env_var_bool("HEALTH_ENABLED", true),
            port: env_var_parse("HEALTH_PORT", 10000),
        };

        Ok(Self {
            telegram_bot_token,
            telegram_chat_id,
            assets,
            timeframe,
            candle_count: env_var_parse("CANDLE_COUNT", 100),
            scan,
            signal,
            health,
        })
    }
}

impl ScanLoopConfig {
    /// 폴링 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// 자산 간 딜레이를 Duration으로 반환
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

/// 쉼표로 구분된 "BASE/QUOTE" 목록을 심볼 목록으로 파싱
fn parse_assets(raw: &str) -> Result<Vec<Symbol>> {
    let entries: Vec<&str> = if raw.trim().is_empty() {
        DEFAULT_ASSETS.to_vec()
    } else {
        raw.split(',').map(|s| s.trim()).collect()
    };

    let mut assets = Vec::with_capacity(entries.len());
    for entry in entries {
        let symbol = Symbol::from_string(entry, MarketType::Forex).ok_or_else(|| {
            ScannerError::Config(format!("잘못된 심볼 형식: {}", entry))
        })?;
        assets.push(symbol);
    }

    if assets.is_empty() {
        return Err(ScannerError::Config("감시할 자산이 없습니다".to_string()));
    }

    Ok(assets)
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
