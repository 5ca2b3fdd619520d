//! 스캔 사이클 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 한 사이클의 스캔 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// 총 자산 수
    pub total: usize,
    /// 건너뛴 자산 수 (캔들 부족)
    pub skipped: usize,
    /// 조회 실패 수
    pub errors: usize,
    /// 확정 신호 수
    pub signals: usize,
    /// 발송된 알림 수
    pub alerts: usize,
    /// 쿨다운으로 억제된 신호 수
    pub suppressed: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScanStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            skipped = self.skipped,
            errors = self.errors,
            signals = self.signals,
            alerts = self.alerts,
            suppressed = self.suppressed,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스캔 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = ScanStats::new();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.alerts, 0);
    }
}
