//! Market map capture
//!
//! Screenshots the treemap element on the Hankyung market map page. Capture
//! needs a local Chrome and is compiled in only with the `marketmap`
//! feature; without it, and on any capture failure, the caller falls back to
//! sending the page link.

use krx_data::Market;

/// Market map pages, keyed by segment
pub fn page_url(market: Market) -> &'static str {
    match market {
        Market::Kospi => "https://markets.hankyung.com/marketmap/kospi",
        Market::Kosdaq => "https://markets.hankyung.com/marketmap/kosdaq",
    }
}

/// Selectors tried in order for the map element. Site markup shifts, so the
/// list runs from the precise id to broad class patterns.
pub const MAP_SELECTORS: [&str; 11] = [
    "#marketMap",
    "div.marketmap",
    "div.market-map",
    "div.marketmap__container",
    "section.marketmap",
    "div[class*='marketmap']",
    "div[class*='market-map']",
    "div[class*='treemap']",
    "#treemap",
    ".treemap",
    "section[class*='market'] div[class*='map']",
];

/// Anything smaller than this is a legend or a stray widget, not the map
pub const MIN_MAP_WIDTH: f64 = 300.0;
pub const MIN_MAP_HEIGHT: f64 = 200.0;

/// On-page size of a candidate element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
}

/// Whether a selector hit is plausibly the map itself
pub fn is_viable_map(size: ElementSize) -> bool {
    size.width >= MIN_MAP_WIDTH && size.height >= MIN_MAP_HEIGHT
}

/// Index of the largest candidate by area; `None` when every candidate has
/// zero area
pub fn largest_by_area(sizes: &[ElementSize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, size) in sizes.iter().enumerate() {
        let area = size.width * size.height;
        if area > 0.0 && best.is_none_or(|(_, best_area)| area > best_area) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

/// Capture the map element as an image, or `None` when anything along the
/// way fails
#[cfg(feature = "marketmap")]
pub async fn capture(market: Market) -> Option<Vec<u8>> {
    use tracing::warn;

    let url = page_url(market);
    match tokio::task::spawn_blocking(move || capture_blocking(url)).await {
        Ok(Ok(image)) => Some(image),
        Ok(Err(error)) => {
            warn!(%market, %error, "market map capture failed");
            None
        }
        Err(error) => {
            warn!(%market, %error, "market map capture task failed");
            None
        }
    }
}

#[cfg(feature = "marketmap")]
fn capture_blocking(url: &str) -> anyhow::Result<Vec<u8>> {
    use anyhow::anyhow;
    use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
    use headless_chrome::Browser;
    use std::time::Duration;

    let browser = Browser::default()?;
    let tab = browser.new_tab()?;
    tab.set_default_timeout(Duration::from_secs(30));
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;
    // The treemap draws after the document settles
    std::thread::sleep(Duration::from_millis(1500));

    for selector in MAP_SELECTORS {
        let Ok(element) = tab.wait_for_element_with_custom_timeout(selector, Duration::from_secs(5))
        else {
            continue;
        };
        let Ok(model) = element.get_box_model() else {
            continue;
        };
        let size = ElementSize {
            width: model.width as f64,
            height: model.height as f64,
        };
        if is_viable_map(size) {
            return Ok(element.capture_screenshot(CaptureScreenshotFormatOption::Jpeg)?);
        }
    }

    // No selector hit; the map is usually the biggest canvas on the page
    let canvases = tab.find_elements("canvas")?;
    let mut measured = Vec::new();
    for (i, canvas) in canvases.iter().enumerate() {
        if let Ok(model) = canvas.get_box_model() {
            measured.push((
                i,
                ElementSize {
                    width: model.width as f64,
                    height: model.height as f64,
                },
            ));
        }
    }
    let sizes: Vec<ElementSize> = measured.iter().map(|(_, size)| *size).collect();
    let pick = largest_by_area(&sizes).ok_or_else(|| anyhow!("no market map element found"))?;
    Ok(canvases[measured[pick].0].capture_screenshot(CaptureScreenshotFormatOption::Jpeg)?)
}

#[cfg(not(feature = "marketmap"))]
pub async fn capture(market: Market) -> Option<Vec<u8>> {
    tracing::debug!(%market, "browser capture not compiled in; degrading to link");
    None
}
