//! Market data seam
//!
//! The bot talks to the exchange through this trait so flows can be tested
//! against canned data.

use async_trait::async_trait;
use chrono::NaiveDate;
use krx_data::{FundamentalRow, IndexOhlcvRow, KrxClient, Market, OhlcvRow, Result, TickerListing};

/// Read-only market data source. Range queries answer rows in ascending
/// date order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Every listing in a market segment
    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerListing>>;

    /// Daily fundamentals for one ticker over a date range
    async fn fundamentals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        code: &str,
    ) -> Result<Vec<FundamentalRow>>;

    /// Daily prices for one ticker over a date range
    async fn ohlcv(&self, from: NaiveDate, to: NaiveDate, code: &str) -> Result<Vec<OhlcvRow>>;

    /// Daily closes for an index over a date range
    async fn index_ohlcv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        index_code: &str,
    ) -> Result<Vec<IndexOhlcvRow>>;
}

#[async_trait]
impl MarketData for KrxClient {
    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerListing>> {
        KrxClient::list_tickers(self, market).await
    }

    async fn fundamentals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        code: &str,
    ) -> Result<Vec<FundamentalRow>> {
        KrxClient::fundamentals(self, from, to, code).await
    }

    async fn ohlcv(&self, from: NaiveDate, to: NaiveDate, code: &str) -> Result<Vec<OhlcvRow>> {
        KrxClient::ohlcv(self, from, to, code).await
    }

    async fn index_ohlcv(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        index_code: &str,
    ) -> Result<Vec<IndexOhlcvRow>> {
        KrxClient::index_ohlcv(self, from, to, index_code).await
    }
}
