//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API를 통해 돌파 신호 알림 및 스캐너 상태 알림을 전송합니다.

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationPriority, NotificationResult,
    NotificationSender,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// 텔레그램 알림 전송 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            enabled: true,
            parse_mode: "HTML".to_string(),
        }
    }

    /// 환경 변수에서 설정을 생성합니다.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        let enabled = std::env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        Some(Self {
            bot_token,
            chat_id,
            enabled,
            parse_mode: "HTML".to_string(),
        })
    }
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        TelegramConfig::from_env().map(Self::new)
    }

    /// 알림을 텔레그램 메시지로 포맷합니다.
    fn format_message(&self, notification: &Notification) -> String {
        let priority_emoji = match notification.priority {
            NotificationPriority::Low => "ℹ️",
            NotificationPriority::Normal => "📊",
            NotificationPriority::High => "🚨",
        };

        let content = match &notification.event {
            NotificationEvent::BreakoutAlert {
                symbol,
                side,
                pattern,
                price,
                signal_time,
            } => {
                let side_emoji = if side == "BUY" { "🟢" } else { "🔴" };
                format!(
                    "{side_emoji} <b>{side} 돌파 신호</b>\n\n\
                     심볼: <code>{symbol}</code>\n\
                     패턴: {pattern} Triangle\n\
                     가격: {price:.5}\n\
                     시각: {} UTC",
                    signal_time.format("%H:%M:%S")
                )
            }

            NotificationEvent::ScannerStarted {
                asset_count,
                interval_secs,
            } => {
                format!(
                    "🤖 <b>스캐너 기동</b>\n\n\
                     감시 종목: {asset_count}개\n\
                     주기: {interval_secs}초"
                )
            }

            NotificationEvent::Custom { title, message } => {
                format!("{priority_emoji} <b>{title}</b>\n\n{message}")
            }
        };

        let timestamp = notification.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        format!("{content}\n\n<i>🕐 {timestamp}</i>")
    }

    /// 텔레그램에 원시 메시지를 전송합니다.
    async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );

        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
            "disable_web_page_preview": true,
        });

        debug!(
            "Sending Telegram message to chat_id: {}",
            self.config.chat_id
        );

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        if response.status().is_success() {
            info!("Telegram notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // 요청 한도 제한 확인
            if status.as_u16() == 429 {
                warn!("Telegram rate limited");
                return Err(NotificationError::RateLimited(60));
            }

            error!("Failed to send Telegram message: {} - {}", status, body);
            Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram notifications are disabled, skipping");
            return Ok(());
        }

        let message = self.format_message(notification);
        self.send_message(&message).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

/// 여러 전송기를 관리하는 알림 관리자.
#[derive(Default)]
pub struct NotificationManager {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl NotificationManager {
    /// 새 알림 관리자를 생성합니다.
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    /// 알림 전송기를 추가합니다.
    pub fn add_sender<S: NotificationSender + 'static>(&mut self, sender: S) {
        self.senders.push(Box::new(sender));
    }

    /// 활성화된 전송기가 있는지 확인합니다.
    pub fn has_enabled_sender(&self) -> bool {
        self.senders.iter().any(|s| s.is_enabled())
    }

    /// 활성화된 모든 전송기를 통해 알림을 전송합니다.
    pub async fn notify(&self, notification: &Notification) -> NotificationResult<()> {
        let mut last_error = None;

        for sender in &self.senders {
            if sender.is_enabled() {
                if let Err(e) = sender.send(notification).await {
                    error!("Failed to send notification via {}: {}", sender.name(), e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            // 전송기가 하나뿐이면 그 실패를 그대로 반환
            if self.senders.iter().filter(|s| s.is_enabled()).count() == 1 {
                return Err(e);
            }
        }

        Ok(())
    }

    /// 돌파 신호 알림을 전송합니다.
    pub async fn notify_breakout_alert(
        &self,
        symbol: &str,
        side: &str,
        pattern: &str,
        price: Decimal,
        signal_time: DateTime<Utc>,
    ) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::BreakoutAlert {
            symbol: symbol.to_string(),
            side: side.to_string(),
            pattern: pattern.to_string(),
            price,
            signal_time,
        })
        .with_priority(NotificationPriority::High);

        self.notify(&notification).await
    }

    /// 스캐너 기동 알림을 전송합니다.
    pub async fn notify_scanner_started(
        &self,
        asset_count: usize,
        interval_secs: u64,
    ) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::ScannerStarted {
            asset_count,
            interval_secs,
        });

        self.notify(&notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_breakout_alert() {
        let config = TelegramConfig::new("test_token".to_string(), "123456".to_string());
        let sender = TelegramSender::new(config);

        let notification = Notification::new(NotificationEvent::BreakoutAlert {
            symbol: "EUR/USD".to_string(),
            side: "BUY".to_string(),
            pattern: "Descending".to_string(),
            price: dec!(1.10500),
            signal_time: Utc::now(),
        });

        let message = sender.format_message(&notification);
        assert!(message.contains("돌파 신호"));
        assert!(message.contains("EUR/USD"));
        assert!(message.contains("Descending Triangle"));
        assert!(message.contains("🟢"));
        assert!(message.contains("1.10500"));
    }

    #[test]
    fn test_format_sell_alert_uses_red_marker() {
        let config = TelegramConfig::new("test_token".to_string(), "123456".to_string());
        let sender = TelegramSender::new(config);

        let notification = Notification::new(NotificationEvent::BreakoutAlert {
            symbol: "GBP/JPY".to_string(),
            side: "SELL".to_string(),
            pattern: "Symmetrical".to_string(),
            price: dec!(185.12345),
            signal_time: Utc::now(),
        });

        let message = sender.format_message(&notification);
        assert!(message.contains("🔴"));
        assert!(message.contains("SELL"));
    }

    #[test]
    fn test_format_scanner_started() {
        let config = TelegramConfig::new("test_token".to_string(), "123456".to_string());
        let sender = TelegramSender::new(config);

        let notification = Notification::new(NotificationEvent::ScannerStarted {
            asset_count: 15,
            interval_secs: 60,
        });

        let message = sender.format_message(&notification);
        assert!(message.contains("스캐너 기동"));
        assert!(message.contains("15"));
    }

    #[test]
    fn test_sender_disabled_without_credentials() {
        let mut config = TelegramConfig::new(String::new(), String::new());
        config.enabled = true;
        let sender = TelegramSender::new(config);

        assert!(!sender.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_sender_skips_send() {
        let mut config = TelegramConfig::new("token".to_string(), "chat".to_string());
        config.enabled = false;
        let sender = TelegramSender::new(config);

        let notification = Notification::new(NotificationEvent::Custom {
            title: "t".to_string(),
            message: "m".to_string(),
        });

        // 비활성화 상태에서는 네트워크 호출 없이 Ok
        assert!(sender.send(&notification).await.is_ok());
    }
}
