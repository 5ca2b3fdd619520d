//! 캔들 데이터를 위한 타임프레임 정의.
//!
//! 스캐너는 단일 고정 타임프레임으로 동작하지만, 데이터 제공자 요청 형식과
//! 캔들 간격 계산을 위해 타임프레임 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 일봉
    D1,
}

impl Timeframe {
    /// 이 타임프레임의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::from_secs(60),
            Timeframe::M5 => Duration::from_secs(5 * 60),
            Timeframe::M15 => Duration::from_secs(15 * 60),
            Timeframe::M30 => Duration::from_secs(30 * 60),
            Timeframe::H1 => Duration::from_secs(60 * 60),
            Timeframe::D1 => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// 이 타임프레임의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }

    /// Yahoo Finance 간격 문자열로 변환합니다.
    pub fn to_yahoo_interval(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
        }
    }

    /// Yahoo Finance 간격 문자열에서 파싱합니다.
    pub fn from_yahoo_interval(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Timeframe::M1),
            "5m" => Some(Timeframe::M5),
            "15m" => Some(Timeframe::M15),
            "30m" => Some(Timeframe::M30),
            "1h" => Some(Timeframe::H1),
            "1d" => Some(Timeframe::D1),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_yahoo_interval())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yahoo_interval(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::M1.as_secs(), 60);
        assert_eq!(Timeframe::H1.as_secs(), 3600);
        assert_eq!(Timeframe::D1.as_secs(), 86400);
    }

    #[test]
    fn test_timeframe_yahoo() {
        assert_eq!(Timeframe::M15.to_yahoo_interval(), "15m");
        assert_eq!(Timeframe::from_yahoo_interval("1h"), Some(Timeframe::H1));
        assert!("bogus".parse::<Timeframe>().is_err());
    }
}
