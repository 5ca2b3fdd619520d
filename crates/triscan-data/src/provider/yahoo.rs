//! Yahoo Finance chart API 클라이언트.
//!
//! chart API v8(`/v8/finance/chart/{symbol}`)에서 OHLCV 캔들을 가져옵니다.
//! 차단을 피하기 위해 브라우저 User-Agent를 사용하고, 개별 요청에만
//! 타임아웃을 겁니다.

use crate::error::{DataError, Result};
use crate::provider::CandleProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use triscan_core::{Candle, Symbol, Timeframe};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Yahoo Finance chart API v8 응답 구조.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

/// Yahoo Finance 캔들 Provider.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// 기본 endpoint로 Provider를 생성합니다.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// 지정된 endpoint로 Provider를 생성합니다 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// 요청할 시간 범위를 계산합니다.
    ///
    /// 외환 시장의 세션 공백을 감안해 필요한 구간의 2배(최소 2일)를
    /// 요청하고, 파싱 후 마지막 `count`개만 남깁니다.
    fn period_range(timeframe: Timeframe, count: usize, now: DateTime<Utc>) -> (i64, i64) {
        let span_secs = (count as u64 * timeframe.as_secs() * 2).max(2 * 86_400);
        let end = now.timestamp();
        (end - span_secs as i64, end)
    }

    /// chart API 응답 본문을 캔들 시리즈로 변환합니다.
    ///
    /// OHLC 중 하나라도 null인 행은 버리고, 거래량 null은 0으로 처리합니다
    /// (외환 시세는 거래량이 비어 있는 경우가 많습니다).
    fn parse_chart(
        body: &str,
        symbol: &Symbol,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>> {
        let response: YahooChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            return Err(DataError::FetchError(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| DataError::Empty(symbol.yahoo_symbol()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Empty(symbol.yahoo_symbol()))?;

        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        let mut candles = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let open = opens.get(i).and_then(|v| *v);
            let high = highs.get(i).and_then(|v| *v);
            let low = lows.get(i).and_then(|v| *v);
            let close = closes.get(i).and_then(|v| *v);
            let volume = volumes.get(i).and_then(|v| *v).unwrap_or(0);

            if let (Some(o), Some(h), Some(l), Some(c)) = (open, high, low, close) {
                let Some(open_time) = DateTime::from_timestamp(ts, 0) else {
                    continue;
                };

                candles.push(Candle::new(
                    symbol.clone(),
                    timeframe,
                    open_time,
                    to_decimal(o),
                    to_decimal(h),
                    to_decimal(l),
                    to_decimal(c),
                    Decimal::from(volume),
                ));
            }
        }

        if candles.is_empty() {
            return Err(DataError::Empty(symbol.yahoo_symbol()));
        }

        candles.sort_by_key(|c| c.open_time);
        if candles.len() > count {
            let excess = candles.len() - count;
            candles.drain(..excess);
        }

        Ok(candles)
    }
}

/// f64 시세를 6자리 Decimal로 변환합니다.
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_str(&format!("{:.6}", value)).unwrap_or_default()
}

#[async_trait]
impl CandleProvider for YahooProvider {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>> {
        let yahoo_symbol = symbol.yahoo_symbol();
        let (period1, period2) = Self::period_range(timeframe, count, Utc::now());

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}",
            self.base_url,
            yahoo_symbol,
            period1,
            period2,
            timeframe.to_yahoo_interval()
        );

        debug!(symbol = %symbol, url = %url, "Fetching candles from Yahoo Finance");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(symbol = %symbol, status = %status, "Yahoo Finance request failed");
            return Err(DataError::FetchError(format!("HTTP {}: {}", status, body)));
        }

        let body = response.text().await?;
        let candles = Self::parse_chart(&body, symbol, timeframe, count)?;

        debug!(symbol = %symbol, count = candles.len(), "Candles fetched");
        Ok(candles)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
