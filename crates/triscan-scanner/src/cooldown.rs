//! 자산별 알림 쿨다운 테이블.
//!
//! 같은 자산에 대한 알림이 쿨다운 시간 내에 반복 전송되는 것을 막습니다.
//! 테이블은 스캔 루프가 소유하며, 항목은 덮어쓰기만 되고 제거되지 않습니다
//! (자산 수만큼만 커집니다).

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// 자산 → 마지막 알림 시각 매핑.
#[derive(Debug)]
pub struct CooldownTable {
    entries: HashMap<String, DateTime<Utc>>,
    cooldown: Duration,
}

impl CooldownTable {
    /// 지정된 쿨다운(초)으로 빈 테이블을 생성합니다.
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            cooldown: Duration::seconds(cooldown_secs as i64),
        }
    }

    /// 해당 자산에 지금 알림을 보내도 되는지 판정합니다.
    ///
    /// 항목이 없거나 마지막 알림 이후 쿨다운을 초과(엄격 비교)했으면 true입니다.
    /// 기록은 별도 단계(`record`)로, 알림 전송을 시도한 뒤에만 수행합니다.
    pub fn should_alert(&self, asset: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(asset) {
            None => true,
            Some(&last) => now - last > self.cooldown,
        }
    }

    /// 해당 자산의 마지막 알림 시각을 기록합니다.
    pub fn record(&mut self, asset: &str, now: DateTime<Utc>) {
        self.entries.insert(asset.to_string(), now);
    }

    /// 기록된 자산 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 테이블이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_first_alert_always_allowed() {
        let table = CooldownTable::new(900);
        assert!(table.should_alert("EUR/USD", at(0)));
    }

    #[test]
    fn test_repeat_within_cooldown_suppressed() {
        let mut table = CooldownTable::new(900);
        table.record("EUR/USD", at(0));

        // 10분 뒤 (600초 < 900초) -> 억제
        assert!(!table.should_alert("EUR/USD", at(600)));
    }

    #[test]
    fn test_repeat_after_cooldown_allowed() {
        let mut table = CooldownTable::new(900);
        table.record("EUR/USD", at(0));

        // 16분 뒤 (960초 > 900초) -> 허용
        assert!(table.should_alert("EUR/USD", at(960)));
    }

    #[test]
    fn test_exact_cooldown_boundary_suppressed() {
        let mut table = CooldownTable::new(900);
        table.record("EUR/USD", at(0));

        // 정확히 900초 경과는 엄격 비교로 억제
        assert!(!table.should_alert("EUR/USD", at(900)));
        assert!(table.should_alert("EUR/USD", at(901)));
    }

    #[test]
    fn test_assets_are_independent() {
        let mut table = CooldownTable::new(900);
        table.record("EUR/USD", at(0));

        assert!(!table.should_alert("EUR/USD", at(100)));
        assert!(table.should_alert("GBP/JPY", at(100)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_record_overwrites_entry() {
        let mut table = CooldownTable::new(900);
        table.record("EUR/USD", at(0));
        table.record("EUR/USD", at(1000));

        assert_eq!(table.len(), 1);
        assert!(!table.should_alert("EUR/USD", at(1500)));
        assert!(table.should_alert("EUR/USD", at(1901)));
    }
}
