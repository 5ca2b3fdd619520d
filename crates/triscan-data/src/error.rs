//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
///
/// 모든 변형은 "이번 사이클에서 해당 자산 건너뛰기"로 복구됩니다.
/// 데이터 오류가 스캔 루프를 중단시키는 일은 없습니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 빈 응답 (조회 성공, 데이터 없음)
    #[error("Empty response: {0}")]
    Empty(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
