//! Company-name to ticker-code resolution
//!
//! Exact registered-name match first, scanning KOSPI before KOSDAQ; only
//! when no segment has an exact match do we fall back to similarity
//! suggestions across both segments.

use crate::data::MarketData;
use crate::error::Result;
use krx_data::Market;

/// Most suggestions ever offered for a near-miss
pub const MAX_SUGGESTIONS: usize = 5;

/// Minimum similarity for a name to count as a near-miss
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// A resolved listing, tagged with the segment it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMatch {
    pub code: String,
    pub name: String,
    pub market: Market,
}

/// Outcome of a resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one listing carries this registered name
    Match(TickerMatch),
    /// No exact match; these registered names are close
    Suggestions(Vec<String>),
    /// Nothing matched and nothing was close
    NotFound,
    /// The input was blank after trimming
    EmptyInput,
}

/// Resolve a user-supplied company name against both market segments
pub async fn resolve(data: &dyn MarketData, input: &str) -> Result<Resolution> {
    let name = input.trim();
    if name.is_empty() {
        return Ok(Resolution::EmptyInput);
    }

    let mut all_names = Vec::new();
    for market in [Market::Kospi, Market::Kosdaq] {
        let listings = data.list_tickers(market).await?;
        if let Some(hit) = listings.iter().find(|listing| listing.name == name) {
            return Ok(Resolution::Match(TickerMatch {
                code: hit.code.clone(),
                name: hit.name.clone(),
                market,
            }));
        }
        all_names.extend(listings.into_iter().map(|listing| listing.name));
    }

    let suggestions = close_matches(name, &all_names);
    if suggestions.is_empty() {
        Ok(Resolution::NotFound)
    } else {
        Ok(Resolution::Suggestions(suggestions))
    }
}

/// Names from `candidates` at least [`SIMILARITY_CUTOFF`] similar to
/// `target`, best first, at most [`MAX_SUGGESTIONS`]
fn close_matches(target: &str, candidates: &[String]) -> Vec<String> {
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|candidate| (similarity(target, candidate), candidate))
        .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
        .collect();
    // Stable sort keeps listing order among equal scores
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.clone())
        .collect()
}

/// Character-level similarity in `[0, 1]`: twice the longest common
/// subsequence over the combined length
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    let lcs = prev[b.len()];
    2.0 * lcs as f64 / (a.len() + b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockMarketData;
    use krx_data::TickerListing;
    use mockall::predicate::eq;

    fn listing(code: &str, name: &str) -> TickerListing {
        TickerListing {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        assert!((similarity("삼성전자", "삼성전자") - 1.0).abs() < 1e-9);
        assert!(similarity("삼성전자", "xyz") < 1e-9);
    }

    #[test]
    fn test_similarity_partial_overlap() {
        // "삼성전자" vs "삼성전기": LCS 3 of 4+4
        let score = similarity("삼성전자", "삼성전기");
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_exact_match_in_primary_segment_skips_secondary() {
        let mut data = MockMarketData::new();
        data.expect_list_tickers()
            .with(eq(Market::Kospi))
            .times(1)
            .returning(|_| Ok(vec![listing("005930", "삼성전자")]));
        // KOSDAQ is never queried

        let resolution = resolve(&data, "삼성전자").await.expect("resolve");
        assert_eq!(
            resolution,
            Resolution::Match(TickerMatch {
                code: "005930".to_string(),
                name: "삼성전자".to_string(),
                market: Market::Kospi,
            })
        );
    }

    #[tokio::test]
    async fn test_exact_match_in_secondary_segment() {
        let mut data = MockMarketData::new();
        data.expect_list_tickers()
            .with(eq(Market::Kospi))
            .returning(|_| Ok(vec![listing("005930", "삼성전자")]));
        data.expect_list_tickers()
            .with(eq(Market::Kosdaq))
            .returning(|_| Ok(vec![listing("247540", "에코프로비엠")]));

        let resolution = resolve(&data, "에코프로비엠").await.expect("resolve");
        match resolution {
            Resolution::Match(hit) => {
                assert_eq!(hit.code, "247540");
                assert_eq!(hit.market, Market::Kosdaq);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_near_miss_yields_suggestions() {
        let mut data = MockMarketData::new();
        data.expect_list_tickers()
            .with(eq(Market::Kospi))
            .returning(|_| {
                Ok(vec![
                    listing("005930", "삼성전자"),
                    listing("009150", "삼성전기"),
                ])
            });
        data.expect_list_tickers()
            .with(eq(Market::Kosdaq))
            .returning(|_| Ok(vec![]));

        let resolution = resolve(&data, "삼성전주").await.expect("resolve");
        match resolution {
            Resolution::Suggestions(names) => {
                assert!(names.contains(&"삼성전자".to_string()));
                assert!(names.len() <= MAX_SUGGESTIONS);
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrelated_input_is_not_found() {
        let mut data = MockMarketData::new();
        data.expect_list_tickers()
            .returning(|_| Ok(vec![listing("005930", "삼성전자")]));

        let resolution = resolve(&data, "zzzzzz").await.expect("resolve");
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_blank_input() {
        let data = MockMarketData::new();
        let resolution = resolve(&data, "   ").await.expect("resolve");
        assert_eq!(resolution, Resolution::EmptyInput);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let candidates: Vec<String> = (0..10).map(|i| format!("삼성전자{i}")).collect();
        let names = close_matches("삼성전자", &candidates);
        assert_eq!(names.len(), MAX_SUGGESTIONS);
    }
}
