//! 스캔 사이클 실행 모듈.
//!
//! 설정된 자산을 고정된 순서로 순회하며 캔들 조회 → 신호 평가 → 쿨다운
//! 판정 → 알림 발송을 수행합니다. 한 자산의 오류가 다른 자산의 처리를
//! 중단시키지 않습니다.

use crate::config::ScannerConfig;
use crate::cooldown::CooldownTable;
use crate::stats::ScanStats;
use chrono::{DateTime, Timelike, Utc};
use std::time::Instant;
use triscan_data::CandleProvider;
use triscan_notification::NotificationManager;
use triscan_strategy::SignalEngine;

/// 현재 시각이 거래 시간(시작 포함, 종료 미포함, UTC) 안에 있는지 판정합니다.
pub fn within_trading_hours(now: DateTime<Utc>, start_hour: u32, end_hour: u32) -> bool {
    let hour = now.hour();
    start_hour <= hour && hour < end_hour
}

/// 스캔 사이클 하나를 실행합니다.
///
/// 조회 실패와 짧은 시리즈는 해당 자산만 건너뛰고, 알림 전송 실패는
/// 로그 후 무시합니다. 쿨다운 기록은 전송 시도 직후 수행되므로 전송
/// 실패 여부와 무관하게 자산은 쿨다운에 들어갑니다.
pub async fn run_cycle(
    provider: &dyn CandleProvider,
    engine: &SignalEngine,
    notifier: &NotificationManager,
    cooldown: &mut CooldownTable,
    config: &ScannerConfig,
) -> ScanStats {
    let start = Instant::now();
    let mut stats = ScanStats::new();

    for symbol in &config.assets {
        stats.total += 1;

        match provider
            .fetch_candles(symbol, config.timeframe, config.candle_count)
            .await
        {
            Ok(candles) if candles.len() >= engine.config().min_window => {
                if let Some(signal) = engine.evaluate(&candles) {
                    stats.signals += 1;
                    let asset_key = signal.symbol.to_standard_string();
                    let now = Utc::now();

                    if cooldown.should_alert(&asset_key, now) {
                        if let Err(e) = notifier
                            .notify_breakout_alert(
                                &asset_key,
                                &signal.side.to_string(),
                                &signal.pattern.to_string(),
                                signal.price,
                                signal.timestamp,
                            )
                            .await
                        {
                            tracing::warn!(symbol = %symbol, error = %e, "알림 전송 실패");
                        }
                        cooldown.record(&asset_key, now);
                        stats.alerts += 1;
                        tracing::info!(
                            symbol = %symbol,
                            side = %signal.side,
                            pattern = %signal.pattern,
                            price = %signal.price,
                            "알림 발송"
                        );
                    } else {
                        stats.suppressed += 1;
                        tracing::debug!(symbol = %symbol, "쿨다운으로 알림 억제");
                    }
                }
            }
            Ok(candles) => {
                stats.skipped += 1;
                tracing::debug!(
                    symbol = %symbol,
                    candles = candles.len(),
                    min = engine.config().min_window,
                    "캔들 부족으로 건너뜀"
                );
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(symbol = %symbol, error = %e, "조회 실패");
            }
        }

        // Rate limiting
        tokio::time::sleep(config.scan.fetch_delay()).await;
    }

    stats.elapsed = start.elapsed();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HealthConfig, ScanLoopConfig};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use triscan_core::{Candle, Symbol, Timeframe};
    use triscan_data::{DataError, Result as DataResult};
    use triscan_strategy::SignalConfig;

    #[test]
    fn test_within_trading_hours() {
        let at = |h: u32| Utc.with_ymd_and_hms(2026, 3, 2, h, 30, 0).unwrap();

        assert!(within_trading_hours(at(10), 10, 22));
        assert!(within_trading_hours(at(21), 10, 22));
        assert!(!within_trading_hours(at(22), 10, 22));
        assert!(!within_trading_hours(at(9), 10, 22));
    }

    fn candle(symbol: &Symbol, i: usize, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle::new(
            symbol.clone(),
            Timeframe::M1,
            Utc.timestamp_opt(1_700_000_000 + (i as i64) * 60, 0).unwrap(),
            open,
            high,
            low,
            close,
            dec!(1000),
        )
    }

    /// 상승 삼각형 후 마지막 캔들이 고점을 돌파하는 윈도우.
    fn breakout_window(symbol: &Symbol) -> Vec<Candle> {
        let mut candles = Vec::new();
        for i in 0..29usize {
            let low = dec!(1.0) + Decimal::from(i) * dec!(0.0003);
            let close = low + dec!(0.0005);
            candles.push(candle(symbol, i, close - dec!(0.0001), dec!(1.0100), low, close));
        }
        candles.push(candle(symbol, 29, dec!(1.0104), dec!(1.0105), dec!(1.0087), dec!(1.0105)));
        candles
    }

    /// 심볼별로 준비된 응답을 반환하는 테스트 Provider.
    struct StubProvider;

    #[async_trait]
    impl CandleProvider for StubProvider {
        async fn fetch_candles(
            &self,
            symbol: &Symbol,
            _timeframe: Timeframe,
            _count: usize,
        ) -> DataResult<Vec<Candle>> {
            match symbol.base.as_str() {
                // 돌파 신호가 나오는 윈도우
                "EUR" => Ok(breakout_window(symbol)),
                // 최소 길이 미달
                "GBP" => Ok(breakout_window(symbol)[..10].to_vec()),
                // 조회 실패
                _ => Err(DataError::FetchError("boom".to_string())),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn test_config() -> ScannerConfig {
        ScannerConfig {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            assets: vec![
                Symbol::forex("EUR", "USD"),
                Symbol::forex("GBP", "JPY"),
                Symbol::forex("AUD", "CAD"),
            ],
            timeframe: Timeframe::M1,
            candle_count: 100,
            scan: ScanLoopConfig {
                interval_secs: 60,
                trading_start_hour: 10,
                trading_end_hour: 22,
                fetch_delay_ms: 0,
                cooldown_secs: 900,
            },
            signal: SignalConfig::default(),
            health: HealthConfig {
                enabled: false,
                port: 0,
            },
        }
    }

    #[tokio::test]
    async fn test_run_cycle_counts_and_dedup() {
        let config = test_config();
        let provider = StubProvider;
        let engine = SignalEngine::new(config.signal.clone());
        let notifier = NotificationManager::new();
        let mut cooldown = CooldownTable::new(config.scan.cooldown_secs);

        let stats = run_cycle(&provider, &engine, &notifier, &mut cooldown, &config).await;

        assert_eq!(stats.total, 3);
        assert_eq!(stats.signals, 1);
        assert_eq!(stats.alerts, 1);
        assert_eq!(stats.suppressed, 0);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(cooldown.len(), 1);

        // 같은 신호가 즉시 반복되면 쿨다운으로 억제된다
        let stats = run_cycle(&provider, &engine, &notifier, &mut cooldown, &config).await;
        assert_eq!(stats.signals, 1);
        assert_eq!(stats.alerts, 0);
        assert_eq!(stats.suppressed, 1);
    }

    #[tokio::test]
    async fn test_one_asset_error_does_not_abort_cycle() {
        let mut config = test_config();
        // 실패하는 자산을 맨 앞에 두어도 나머지 자산은 처리된다
        config.assets.rotate_right(1);

        let provider = StubProvider;
        let engine = SignalEngine::new(config.signal.clone());
        let notifier = NotificationManager::new();
        let mut cooldown = CooldownTable::new(config.scan.cooldown_secs);

        let stats = run_cycle(&provider, &engine, &notifier, &mut cooldown, &config).await;

        assert_eq!(stats.total, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.alerts, 1);
    }
}
