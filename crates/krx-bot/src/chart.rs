//! Daily chart rendering
//!
//! Best effort by contract: a candlestick chart with moving averages when
//! the data supports it, a plain close line when it does not, and `None`
//! when nothing can be drawn. No render failure ever aborts an analysis.

use crate::data::MarketData;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Calendar days of history requested; roughly 180 sessions
const QUERY_WINDOW_DAYS: i64 = 360;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 600;

/// Moving-average overlays, shortest first
const MA_PERIODS: [usize; 3] = [5, 20, 60];

/// One fully-priced session
#[derive(Debug, Clone, Copy)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Render the daily chart for a ticker as PNG bytes. Every failure path
/// answers `None`.
pub async fn render_daily_chart(
    data: &dyn MarketData,
    code: &str,
    today: NaiveDate,
) -> Option<Vec<u8>> {
    let from = today - Duration::days(QUERY_WINDOW_DAYS);
    let rows = match data.ohlcv(from, today, code).await {
        Ok(rows) => rows,
        Err(error) => {
            warn!(code, %error, "chart price query failed");
            return None;
        }
    };
    // Halted sessions come through with absent prices; skip them
    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            Some(Candle {
                open: row.open? as f64,
                high: row.high? as f64,
                low: row.low? as f64,
                close: row.close? as f64,
            })
        })
        .collect();
    if candles.is_empty() {
        debug!(code, "no priced sessions to chart");
        return None;
    }

    let code = code.to_string();
    let rendered = tokio::task::spawn_blocking(move || render_png(&code, &candles)).await;
    match rendered {
        Ok(Some(png)) => Some(png),
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "chart render task failed");
            None
        }
    }
}

/// Try the renderers in order of preference against a temp file
fn render_png(code: &str, candles: &[Candle]) -> Option<Vec<u8>> {
    // Unique per render; concurrent analyses of the same ticker must not
    // share a file
    static RENDER_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
    let seq = RENDER_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "krx-chart-{code}-{}-{seq}.png",
        std::process::id()
    ));
    let renderers: [(&str, fn(&Path, &str, &[Candle]) -> Result<()>); 2] = [
        ("candlestick", draw_candlestick),
        ("close-line", draw_close_line),
    ];
    let mut png = None;
    for (style, renderer) in renderers {
        match renderer(&path, code, candles) {
            Ok(()) => match std::fs::read(&path) {
                Ok(bytes) => {
                    png = Some(bytes);
                    break;
                }
                Err(error) => {
                    warn!(%error, style, "rendered chart unreadable");
                }
            },
            Err(error) => {
                debug!(%error, style, "chart renderer failed, trying next");
            }
        }
    }
    let _ = std::fs::remove_file(&path);
    png
}

fn draw_candlestick(path: &Path, code: &str, candles: &[Candle]) -> Result<()> {
    let (low, high) = price_bounds(candles).context("empty candle set")?;
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{code} daily"), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(70)
        .build_cartesian_2d(-1i32..candles.len() as i32, low..high)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("KRW")
        .draw()?;

    // Korean convention: red up, blue down
    chart.draw_series(candles.iter().enumerate().map(|(i, candle)| {
        CandleStick::new(
            i as i32,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            RED.filled(),
            BLUE.filled(),
            3,
        )
    }))?;

    let closes: Vec<f64> = candles.iter().map(|candle| candle.close).collect();
    let palette = [
        RGBColor(0xf3, 0x9c, 0x12),
        RGBColor(0x27, 0xae, 0x60),
        RGBColor(0x8e, 0x44, 0xad),
    ];
    for (period, color) in MA_PERIODS.into_iter().zip(palette) {
        let series = moving_average(&closes, period);
        if !series.is_empty() {
            chart.draw_series(LineSeries::new(series, color.stroke_width(2)))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_close_line(path: &Path, code: &str, candles: &[Candle]) -> Result<()> {
    let (low, high) = price_bounds(candles).context("empty candle set")?;
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{code} daily close"), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(70)
        .build_cartesian_2d(-1i32..candles.len() as i32, low..high)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("KRW")
        .draw()?;

    chart.draw_series(LineSeries::new(
        candles
            .iter()
            .enumerate()
            .map(|(i, candle)| (i as i32, candle.close)),
        RGBColor(0x2e, 0x86, 0xde).stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

/// Vertical range with a small margin so wicks never touch the frame
fn price_bounds(candles: &[Candle]) -> Option<(f64, f64)> {
    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !low.is_finite() || !high.is_finite() {
        return None;
    }
    let margin = ((high - low) * 0.05).max(1.0);
    Some((low - margin, high + margin))
}

/// Trailing simple moving average, positioned at each window's last index
fn moving_average(closes: &[f64], period: usize) -> Vec<(i32, f64)> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    closes
        .windows(period)
        .enumerate()
        .map(|(i, window)| {
            let mean = window.iter().sum::<f64>() / period as f64;
            ((i + period - 1) as i32, mean)
        })
        .collect()
}
