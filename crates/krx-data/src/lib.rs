//! KRX open-data client
//!
//! Thin client for the KRX market data service (data.krx.co.kr). Covers the
//! handful of screens the bot needs:
//!
//! - Ticker listings per market segment (KOSPI / KOSDAQ)
//! - Per-ticker fundamentals by date range (PER, PBR, EPS, BPS, dividend
//!   yield)
//! - Per-ticker daily OHLCV by date range
//! - Index OHLCV by date range
//!
//! All date parameters use the service's `YYYYMMDD` convention. Numeric
//! fields arrive as comma-grouped strings where `-` or an empty string means
//! "no value"; they are normalized to `Option`s here so callers never see
//! the wire quirks.

pub mod client;
pub mod error;
pub mod model;

pub use client::KrxClient;
pub use error::{KrxError, Result};
pub use model::{FundamentalRow, IndexOhlcvRow, Market, OhlcvRow, TickerListing};
