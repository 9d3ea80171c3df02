//! Data model and wire-value parsing for the KRX service

use crate::error::{KrxError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Main board
    Kospi,
    /// Growth board
    Kosdaq,
}

impl Market {
    /// Segment id the KRX screens expect
    pub fn segment_id(self) -> &'static str {
        match self {
            Market::Kospi => "STK",
            Market::Kosdaq => "KSQ",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Kospi => write!(f, "KOSPI"),
            Market::Kosdaq => write!(f, "KOSDAQ"),
        }
    }
}

/// One listed company in a market segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerListing {
    /// Exchange-assigned short code (e.g., "005930")
    pub code: String,
    /// Registered short name (e.g., "삼성전자")
    pub name: String,
}

/// Daily fundamentals for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRow {
    pub date: NaiveDate,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
    pub eps: Option<f64>,
    pub bps: Option<f64>,
    pub div_yield: Option<f64>,
}

/// One daily price record for a ticker (whole-won prices)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhlcvRow {
    pub date: NaiveDate,
    pub open: Option<i64>,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub close: Option<i64>,
    pub volume: u64,
}

/// One daily record for an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOhlcvRow {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// Format a date the way the KRX screens expect
pub(crate) fn yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a trade-date field. The service answers with `YYYY/MM/DD`; accept
/// plain `YYYYMMDD` too since request parameters use it.
pub(crate) fn parse_trade_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .map_err(|_| KrxError::Parse(format!("bad trade date: {raw:?}")))
}

/// Parse a comma-grouped decimal. `-`, empty, and unparsable values are
/// treated as absent, matching how the service marks halted/unpublished
/// figures.
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a comma-grouped integer, with the same absence rules
pub(crate) fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_display_and_segment() {
        assert_eq!(Market::Kospi.to_string(), "KOSPI");
        assert_eq!(Market::Kosdaq.to_string(), "KOSDAQ");
        assert_eq!(Market::Kospi.segment_id(), "STK");
        assert_eq!(Market::Kosdaq.segment_id(), "KSQ");
    }

    #[test]
    fn test_parse_decimal_grouped() {
        assert_eq!(parse_decimal("1,234.56"), Some(1234.56));
        assert_eq!(parse_decimal("12.4"), Some(12.4));
        assert_eq!(parse_decimal(" 7 "), Some(7.0));
    }

    #[test]
    fn test_parse_decimal_absent_markers() {
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("  "), None);
        assert_eq!(parse_decimal("N/A"), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("71,500"), Some(71_500));
        assert_eq!(parse_integer("-"), None);
        // Negative change values do occur on some screens
        assert_eq!(parse_integer("-1,200"), Some(-1_200));
    }

    #[test]
    fn test_parse_trade_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 8, 29).expect("date");
        assert_eq!(parse_trade_date("2025/08/29").expect("slash"), expected);
        assert_eq!(parse_trade_date("20250829").expect("plain"), expected);
        assert!(parse_trade_date("29-08-2025").is_err());
    }

    #[test]
    fn test_yyyymmdd_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).expect("date");
        assert_eq!(yyyymmdd(date), "20250103");
    }
}
