//! Standalone scan daemon CLI.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use triscan_core::logging::{init_logging, LogConfig};
use triscan_data::YahooProvider;
use triscan_notification::{NotificationManager, TelegramConfig, TelegramSender};
use triscan_scanner::{health, modules, CooldownTable, ScannerConfig, ScannerError};
use triscan_strategy::SignalEngine;

#[derive(Parser)]
#[command(name = "triscan-scanner")]
#[command(about = "TriScan Triangle Breakout Scanner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 스캔 사이클 1회 실행 (거래 시간 제한 무시)
    Scan,

    /// 데몬 모드: 거래 시간 내에서 주기적으로 스캔 실행
    Daemon,
}

#[tokio::main]
async fn main() -> triscan_scanner::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화 (RUST_LOG가 없으면 CLI 레벨 사용)
    let mut log_config = LogConfig::from_env();
    if std::env::var("RUST_LOG").is_err() {
        log_config.level = format!(
            "triscan_scanner={level},triscan_strategy={level},triscan_data={level},triscan_notification={level}",
            level = cli.log_level
        );
    }
    init_logging(log_config).map_err(|e| ScannerError::Config(format!("로깅 초기화 실패: {}", e)))?;

    tracing::info!("TriScan Scanner 시작");

    // 설정 로드 (필수 항목 누락 시 기동 거부)
    let config = ScannerConfig::from_env()?;
    tracing::info!(
        assets = config.assets.len(),
        interval_secs = config.scan.interval_secs,
        trading_hours = format!(
            "{:02}-{:02} UTC",
            config.scan.trading_start_hour, config.scan.trading_end_hour
        ),
        "설정 로드 완료"
    );

    let provider = YahooProvider::new()?;
    let engine = SignalEngine::new(config.signal.clone());

    let mut notifier = NotificationManager::new();
    notifier.add_sender(TelegramSender::new(TelegramConfig::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    )));
    if !notifier.has_enabled_sender() {
        tracing::warn!("활성화된 알림 전송기가 없습니다 (텔레그램 자격증명 확인 필요)");
    }

    let mut cooldown = CooldownTable::new(config.scan.cooldown_secs);

    match cli.command {
        Commands::Scan => {
            let stats =
                modules::run_cycle(&provider, &engine, &notifier, &mut cooldown, &config).await;
            stats.log_summary("단일 스캔");
        }
        Commands::Daemon => {
            // 헬스 체크 서버는 스캔 루프와 상태를 공유하지 않는 독립 태스크
            if config.health.enabled {
                let state = Arc::new(health::HealthState::new(config.assets.len()));
                let port = config.health.port;
                tokio::spawn(async move {
                    if let Err(e) = health::serve(port, state).await {
                        tracing::error!(error = %e, "헬스 체크 서버 실패");
                    }
                });
            }

            // 기동 알림 (실패해도 스캔은 계속)
            if let Err(e) = notifier
                .notify_scanner_started(config.assets.len(), config.scan.interval_secs)
                .await
            {
                tracing::warn!(error = %e, "기동 알림 전송 실패");
            }

            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}초) ===",
                config.scan.interval_secs
            );

            let mut interval = tokio::time::interval(config.scan.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        let now = chrono::Utc::now();
                        if !modules::within_trading_hours(
                            now,
                            config.scan.trading_start_hour,
                            config.scan.trading_end_hour,
                        ) {
                            tracing::debug!(hour = now.format("%H:%M").to_string(), "거래 시간 외, 사이클 건너뜀");
                            continue;
                        }

                        let stats =
                            modules::run_cycle(&provider, &engine, &notifier, &mut cooldown, &config)
                                .await;
                        stats.log_summary("스캔");
                    }
                }
            }
        }
    }

    tracing::info!("TriScan Scanner 종료");

    Ok(())
}
