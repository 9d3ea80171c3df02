//! HTTP client for the KRX data service

use crate::error::{KrxError, Result};
use crate::model::{
    self, FundamentalRow, IndexOhlcvRow, Market, OhlcvRow, TickerListing,
};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "http://data.krx.co.kr/comm/bldAttendant/getJsonData.cmd";
const REFERER: &str = "http://data.krx.co.kr/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Screen ids ("bld") for the generated-JSON endpoint
const BLD_TICKER_FINDER: &str = "dbms/comm/finder/finder_stkisu";
const BLD_FUNDAMENTALS: &str = "dbms/MDC/STAT/standard/MDCSTAT03502";
const BLD_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT01701";
const BLD_INDEX_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT00301";

/// KRX data service client
///
/// The service exposes one POST endpoint; the `bld` form field selects the
/// screen and the remaining fields are that screen's parameters. Responses
/// are JSON with the rows under a screen-specific key.
#[derive(Debug, Clone)]
pub struct KrxClient {
    client: Client,
    endpoint: String,
}

impl KrxClient {
    /// Create a client against the public endpoint
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Create a client against a custom endpoint (tests, mirrors)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let mut instance = Self::new()?;
        instance.endpoint = endpoint.into();
        Ok(instance)
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        debug!(bld = params.first().map(|(_, v)| *v), "KRX query");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Referer", REFERER)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KrxError::Api(format!("HTTP {}", response.status())));
        }

        Ok(response.json().await?)
    }

    /// List all tickers in a market segment, code and registered name
    pub async fn list_tickers(&self, market: Market) -> Result<Vec<TickerListing>> {
        let value = self
            .fetch(&[
                ("bld", BLD_TICKER_FINDER),
                ("mktsel", market.segment_id()),
                ("searchText", ""),
            ])
            .await?;

        listings_from_value(&value)
    }

    /// Look up a ticker's registered name by its short code
    pub async fn ticker_name(&self, code: &str) -> Result<Option<String>> {
        let value = self
            .fetch(&[
                ("bld", BLD_TICKER_FINDER),
                ("mktsel", "ALL"),
                ("searchText", code),
            ])
            .await?;

        let listings = listings_from_value(&value)?;
        Ok(listings
            .into_iter()
            .find(|listing| listing.code == code)
            .map(|listing| listing.name))
    }

    /// Daily fundamentals for a ticker over a date range, oldest first
    pub async fn fundamentals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        code: &str,
    ) -> Result<Vec<FundamentalRow>> {
        let (from, to) = (model::yyyymmdd(from), model::yyyymmdd(to));
        let value = self
            .fetch(&[
                ("bld", BLD_FUNDAMENTALS),
                ("isuCd", code),
                ("strtDd", &from),
                ("endDd", &to),
            ])
            .await?;

        fundamentals_from_value(&value)
    }

    /// Daily OHLCV for a ticker over a date range, oldest first
    pub async fn ohlcv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        code: &str,
    ) -> Result<Vec<OhlcvRow>> {
        let (from, to) = (model::yyyymmdd(from), model::yyyymmdd(to));
        let value = self
            .fetch(&[
                ("bld", BLD_OHLCV),
                ("isuCd", code),
                ("strtDd", &from),
                ("endDd", &to),
            ])
            .await?;

        ohlcv_from_value(&value)
    }

    /// Daily index records over a date range, oldest first
    pub async fn index_ohlcv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        index_code: &str,
    ) -> Result<Vec<IndexOhlcvRow>> {
        let (from, to) = (model::yyyymmdd(from), model::yyyymmdd(to));
        let value = self
            .fetch(&[
                ("bld", BLD_INDEX_OHLCV),
                ("indIdx", index_code),
                ("strtDd", &from),
                ("endDd", &to),
            ])
            .await?;

        index_ohlcv_from_value(&value)
    }
}

// === Wire rows ===

#[derive(Debug, Deserialize)]
struct FinderRow {
    #[serde(rename = "ISU_SRT_CD")]
    code: String,
    #[serde(rename = "ISU_ABBRV")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct FundamentalWireRow {
    #[serde(rename = "TRD_DD")]
    trade_date: String,
    #[serde(rename = "PER", default)]
    per: String,
    #[serde(rename = "PBR", default)]
    pbr: String,
    #[serde(rename = "EPS", default)]
    eps: String,
    #[serde(rename = "BPS", default)]
    bps: String,
    #[serde(rename = "DVD_YLD", default)]
    div_yield: String,
}

#[derive(Debug, Deserialize)]
struct OhlcvWireRow {
    #[serde(rename = "TRD_DD")]
    trade_date: String,
    #[serde(rename = "TDD_OPNPRC", default)]
    open: String,
    #[serde(rename = "TDD_HGPRC", default)]
    high: String,
    #[serde(rename = "TDD_LWPRC", default)]
    low: String,
    #[serde(rename = "TDD_CLSPRC", default)]
    close: String,
    #[serde(rename = "ACC_TRDVOL", default)]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct IndexWireRow {
    #[serde(rename = "TRD_DD")]
    trade_date: String,
    #[serde(rename = "CLSPRC_IDX", default)]
    close: String,
}

/// Pull the row array out of a screen response. Different screens use
/// different keys, so try the known ones in order.
fn rows_of<'a>(value: &'a serde_json::Value) -> Result<&'a Vec<serde_json::Value>> {
    for key in ["output", "OutBlock_1", "block1"] {
        if let Some(rows) = value.get(key).and_then(|entry| entry.as_array()) {
            return Ok(rows);
        }
    }
    Err(KrxError::Api("no row block in response".to_string()))
}

fn listings_from_value(value: &serde_json::Value) -> Result<Vec<TickerListing>> {
    rows_of(value)?
        .iter()
        .map(|row| {
            let wire: FinderRow = serde_json::from_value(row.clone())?;
            Ok(TickerListing {
                code: wire.code,
                name: wire.name,
            })
        })
        .collect()
}

fn fundamentals_from_value(value: &serde_json::Value) -> Result<Vec<FundamentalRow>> {
    let mut rows = rows_of(value)?
        .iter()
        .map(|row| {
            let wire: FundamentalWireRow = serde_json::from_value(row.clone())?;
            Ok(FundamentalRow {
                date: model::parse_trade_date(&wire.trade_date)?,
                per: model::parse_decimal(&wire.per),
                pbr: model::parse_decimal(&wire.pbr),
                eps: model::parse_decimal(&wire.eps),
                bps: model::parse_decimal(&wire.bps),
                div_yield: model::parse_decimal(&wire.div_yield),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // The service answers newest-first; callers get chronological order.
    rows.sort_by_key(|row| row.date);
    Ok(rows)
}

fn ohlcv_from_value(value: &serde_json::Value) -> Result<Vec<OhlcvRow>> {
    let mut rows = rows_of(value)?
        .iter()
        .map(|row| {
            let wire: OhlcvWireRow = serde_json::from_value(row.clone())?;
            Ok(OhlcvRow {
                date: model::parse_trade_date(&wire.trade_date)?,
                open: model::parse_integer(&wire.open),
                high: model::parse_integer(&wire.high),
                low: model::parse_integer(&wire.low),
                close: model::parse_integer(&wire.close),
                volume: model::parse_integer(&wire.volume).unwrap_or(0) as u64,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by_key(|row| row.date);
    Ok(rows)
}

fn index_ohlcv_from_value(value: &serde_json::Value) -> Result<Vec<IndexOhlcvRow>> {
    let mut rows = rows_of(value)?
        .iter()
        .map(|row| {
            let wire: IndexWireRow = serde_json::from_value(row.clone())?;
            Ok(IndexOhlcvRow {
                date: model::parse_trade_date(&wire.trade_date)?,
                close: model::parse_decimal(&wire.close),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by_key(|row| row.date);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listings_from_finder_block() {
        let value = json!({
            "block1": [
                {"ISU_SRT_CD": "005930", "ISU_ABBRV": "삼성전자", "MKT_NM": "KOSPI"},
                {"ISU_SRT_CD": "000660", "ISU_ABBRV": "SK하이닉스", "MKT_NM": "KOSPI"}
            ]
        });
        let listings = listings_from_value(&value).expect("listings");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].code, "005930");
        assert_eq!(listings[0].name, "삼성전자");
    }

    #[test]
    fn test_fundamentals_sorted_and_normalized() {
        let value = json!({
            "output": [
                {"TRD_DD": "2025/08/29", "PER": "12.40", "PBR": "1.21",
                 "EPS": "5,777", "BPS": "57,930", "DVD_YLD": "2.02"},
                {"TRD_DD": "2025/08/28", "PER": "-", "PBR": "",
                 "EPS": "5,777", "BPS": "57,930", "DVD_YLD": "-"}
            ]
        });
        let rows = fundamentals_from_value(&value).expect("rows");
        assert_eq!(rows.len(), 2);
        // Oldest first after sorting
        assert_eq!(
            rows[0].date,
            NaiveDate::from_ymd_opt(2025, 8, 28).expect("date")
        );
        assert_eq!(rows[0].per, None);
        assert_eq!(rows[0].div_yield, None);
        assert_eq!(rows[1].per, Some(12.40));
        assert_eq!(rows[1].eps, Some(5_777.0));
    }

    #[test]
    fn test_ohlcv_halt_day_has_no_close() {
        let value = json!({
            "output": [
                {"TRD_DD": "2025/08/29", "TDD_OPNPRC": "-", "TDD_HGPRC": "-",
                 "TDD_LWPRC": "-", "TDD_CLSPRC": "-", "ACC_TRDVOL": "0"}
            ]
        });
        let rows = ohlcv_from_value(&value).expect("rows");
        assert_eq!(rows[0].close, None);
        assert_eq!(rows[0].volume, 0);
    }

    #[test]
    fn test_ohlcv_regular_day() {
        let value = json!({
            "output": [
                {"TRD_DD": "2025/08/29", "TDD_OPNPRC": "70,900", "TDD_HGPRC": "71,700",
                 "TDD_LWPRC": "70,600", "TDD_CLSPRC": "71,500", "ACC_TRDVOL": "11,118,683"}
            ]
        });
        let rows = ohlcv_from_value(&value).expect("rows");
        assert_eq!(rows[0].close, Some(71_500));
        assert_eq!(rows[0].volume, 11_118_683);
    }

    #[test]
    fn test_index_rows() {
        let value = json!({
            "output": [
                {"TRD_DD": "2025/08/29", "CLSPRC_IDX": "2,712.14"}
            ]
        });
        let rows = index_ohlcv_from_value(&value).expect("rows");
        assert_eq!(rows[0].close, Some(2712.14));
    }

    #[test]
    fn test_missing_block_is_api_error() {
        let value = json!({"unexpected": []});
        assert!(matches!(
            listings_from_value(&value),
            Err(KrxError::Api(_))
        ));
    }

    #[tokio::test]
    #[ignore = "hits the live KRX endpoint"]
    async fn test_live_list_tickers() {
        let client = KrxClient::new().expect("client");
        let listings = client.list_tickers(Market::Kospi).await.expect("listings");
        assert!(listings.iter().any(|listing| listing.code == "005930"));
    }

    #[tokio::test]
    #[ignore = "hits the live KRX endpoint"]
    async fn test_live_ticker_name() {
        let client = KrxClient::new().expect("client");
        let name = client.ticker_name("005930").await.expect("lookup");
        assert_eq!(name.as_deref(), Some("삼성전자"));
    }
}
