//! Latest published fundamentals and closing price for a ticker
//!
//! The exchange publishes nothing on holidays and halted names, so "latest"
//! means the newest row inside a lookback window, not today.

use crate::data::MarketData;
use crate::error::Result;
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// KOSPI composite index code on the index screen
pub const KOSPI_INDEX_CODE: &str = "1001";

/// Newest fundamentals found in the lookback window, with the close from the
/// same session when one was published
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalSnapshot {
    pub as_of: NaiveDate,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
    pub eps: Option<f64>,
    pub bps: Option<f64>,
    pub div_yield: Option<f64>,
    pub close: Option<i64>,
}

/// Outcome of a snapshot fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Snapshot(FundamentalSnapshot),
    /// The whole window was empty (halt, long holiday, bad code)
    NoData,
}

/// Fetch the newest fundamentals for `code` in the `lookback_days` window
/// ending at `today`, then the same-session close.
pub async fn fetch_latest(
    data: &dyn MarketData,
    code: &str,
    today: NaiveDate,
    lookback_days: i64,
) -> Result<FetchOutcome> {
    let from = today - Duration::days(lookback_days);
    let rows = data.fundamentals(from, today, code).await?;
    let Some(latest) = rows.into_iter().max_by_key(|row| row.date) else {
        debug!(code, %from, %today, "no fundamentals in window");
        return Ok(FetchOutcome::NoData);
    };

    // Same-session close; a missing or halted session leaves it unconfirmed
    let close = data
        .ohlcv(latest.date, latest.date, code)
        .await?
        .last()
        .and_then(|row| row.close);

    Ok(FetchOutcome::Snapshot(FundamentalSnapshot {
        as_of: latest.date,
        per: latest.per,
        pbr: latest.pbr,
        eps: latest.eps,
        bps: latest.bps,
        div_yield: latest.div_yield,
        close,
    }))
}

/// Most recent session close for an index, walking back one day at a time
/// from `today`. Answers the close and its session date.
pub async fn recent_index_close(
    data: &dyn MarketData,
    index_code: &str,
    today: NaiveDate,
    lookback_days: i64,
) -> Result<Option<(f64, NaiveDate)>> {
    for offset in 0..lookback_days {
        let day = today - Duration::days(offset);
        let rows = data.index_ohlcv(day, day, index_code).await?;
        if let Some(close) = rows.last().and_then(|row| row.close) {
            return Ok(Some((close, day)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockMarketData;
    use krx_data::{FundamentalRow, IndexOhlcvRow, OhlcvRow};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn row(d: NaiveDate, per: Option<f64>) -> FundamentalRow {
        FundamentalRow {
            date: d,
            per,
            pbr: Some(1.2),
            eps: Some(5000.0),
            bps: Some(60000.0),
            div_yield: Some(2.1),
        }
    }

    #[tokio::test]
    async fn test_latest_row_wins() {
        let friday = date(2025, 8, 29);
        let mut data = MockMarketData::new();
        data.expect_fundamentals().returning(move |_, _, _| {
            Ok(vec![
                row(date(2025, 8, 27), Some(10.0)),
                row(friday, Some(12.5)),
            ])
        });
        data.expect_ohlcv().returning(move |from, to, _| {
            assert_eq!(from, to);
            Ok(vec![OhlcvRow {
                date: from,
                open: Some(70_000),
                high: Some(72_000),
                low: Some(69_500),
                close: Some(71_500),
                volume: 1_000_000,
            }])
        });

        let outcome = fetch_latest(&data, "005930", friday, 14).await.expect("fetch");
        match outcome {
            FetchOutcome::Snapshot(snapshot) => {
                assert_eq!(snapshot.as_of, friday);
                assert_eq!(snapshot.per, Some(12.5));
                assert_eq!(snapshot.close, Some(71_500));
            }
            FetchOutcome::NoData => panic!("expected snapshot"),
        }
    }

    #[tokio::test]
    async fn test_empty_window_is_no_data() {
        let mut data = MockMarketData::new();
        data.expect_fundamentals().returning(|_, _, _| Ok(vec![]));

        let outcome = fetch_latest(&data, "005930", date(2025, 8, 29), 14)
            .await
            .expect("fetch");
        assert_eq!(outcome, FetchOutcome::NoData);
    }

    #[tokio::test]
    async fn test_missing_close_stays_unconfirmed() {
        let day = date(2025, 8, 29);
        let mut data = MockMarketData::new();
        data.expect_fundamentals()
            .returning(move |_, _, _| Ok(vec![row(day, Some(9.0))]));
        data.expect_ohlcv().returning(|_, _, _| Ok(vec![]));

        let outcome = fetch_latest(&data, "005930", day, 14).await.expect("fetch");
        match outcome {
            FetchOutcome::Snapshot(snapshot) => assert_eq!(snapshot.close, None),
            FetchOutcome::NoData => panic!("expected snapshot"),
        }
    }

    #[tokio::test]
    async fn test_index_walks_back_over_holidays() {
        let monday = date(2025, 9, 1);
        let friday = date(2025, 8, 29);
        let mut data = MockMarketData::new();
        data.expect_index_ohlcv().returning(move |from, _, _| {
            if from == friday {
                Ok(vec![IndexOhlcvRow {
                    date: friday,
                    close: Some(2655.28),
                }])
            } else {
                Ok(vec![])
            }
        });

        let found = recent_index_close(&data, KOSPI_INDEX_CODE, monday, 14)
            .await
            .expect("fetch");
        assert_eq!(found, Some((2655.28, friday)));
    }

    #[tokio::test]
    async fn test_index_exhausted_window() {
        let mut data = MockMarketData::new();
        data.expect_index_ohlcv().returning(|_, _, _| Ok(vec![]));

        let found = recent_index_close(&data, KOSPI_INDEX_CODE, date(2025, 9, 1), 3)
            .await
            .expect("fetch");
        assert_eq!(found, None);
    }
}
