//! Report prompts and composition
//!
//! Prompts pin the model to the exchange figures it is handed; figures the
//! exchange did not publish reach the model as an explicit sentinel, never
//! as zeros.

use crate::format::{format_number, format_percent, format_price};
use crate::fundamentals::FundamentalSnapshot;
use crate::resolver::TickerMatch;
use bot_llm::{GenerationRequest, LLMProvider};
use std::sync::Arc;
use tracing::error;

/// Analyst persona and report layout for every generated report
pub const SYSTEM_PROMPT: &str = "\
[SYSTEM]
당신은 월스트리트 20년 경력의 시니어 애널리스트입니다.
제공된 [KRX 공식 데이터]를 철저하게 분석하여 조언합니다.
데이터의 '기준일'을 최우선으로 고려하세요.

[보고서 양식]

📊 3줄 요약: (KRX 데이터 기반 현재 상황 압축)
💡 핵심 투자 포인트: (중요 이유 3가지)
📈 펀더멘탈 분석: (제공된 PER, PBR, EPS 수치를 동종업계/과거와 비교 평가)
✅ 실행 체크리스트: (매수/보류/매도 행동 지침)
주의: '[OUTPUT FORMAT]' 같은 제목은 출력하지 마세요.";

/// Render the verified-figures block for one ticker
pub fn stock_info_block(ticker: &TickerMatch, snapshot: &FundamentalSnapshot) -> String {
    format!(
        "■ 종목명: {name} ({code} / {market})\n\
         ■ 기준일: {as_of} (최근 영업일)\n\
         ■ 현재가: {price}원\n\
         ■ PER: {per}배\n\
         ■ PBR: {pbr}배\n\
         ■ EPS: {eps}원\n\
         ■ BPS: {bps}원\n\
         ■ 배당수익률: {div}\n\
         (출처: KRX 정보데이터시스템)",
        name = ticker.name,
        code = ticker.code,
        market = ticker.market,
        as_of = snapshot.as_of.format("%Y-%m-%d"),
        price = format_price(snapshot.close),
        per = format_number(snapshot.per),
        pbr = format_number(snapshot.pbr),
        eps = format_number(snapshot.eps),
        bps = format_number(snapshot.bps),
        div = format_percent(snapshot.div_yield),
    )
}

/// One-line market summary fed to the market report prompt
pub fn market_info_line(index_close: Option<(f64, chrono::NaiveDate)>) -> String {
    match index_close {
        // Whole points are enough for the overview line
        Some((close, date)) => format!(
            "현재 코스피 지수: {} (기준일: {})",
            format_number(Some(close.trunc())),
            date.format("%Y-%m-%d")
        ),
        None => "시장 지수 조회 실패".to_string(),
    }
}

/// Turns prompts into user-facing report text. LLM failures become an inline
/// note in the reply instead of an error.
pub struct ReportComposer {
    provider: Arc<dyn LLMProvider>,
}

impl ReportComposer {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Full analyst report for one ticker
    pub async fn stock_report(&self, stock_name: &str, info_block: &str) -> String {
        let prompt = format!(
            "[분석대상] {stock_name}\n\
             [KRX 공식 데이터]\n\
             {info_block}\n\n\
             위 팩트 데이터를 기반으로 투자자를 위한 리포트를 작성하세요.\n\
             데이터에 '정보없음'이나 0이 많다면 그 이유도 설명하세요."
        );
        self.generate(prompt).await
    }

    /// Market overview report from the index summary line
    pub async fn market_report(&self, market_info: &str) -> String {
        let prompt =
            format!("[정보] {market_info}\n오늘 한국 증시 시황을 요약하고 간단히 전망해주세요.");
        self.generate(prompt).await
    }

    async fn generate(&self, prompt: String) -> String {
        let request = GenerationRequest::new(prompt).with_system(SYSTEM_PROMPT);
        match self.provider.generate(request).await {
            Ok(response) => response.text,
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "report generation failed");
                format!("(AI 응답 오류: {e})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bot_llm::{GenerationResponse, LLMError};
    use chrono::NaiveDate;
    use krx_data::Market;

    struct FixedProvider {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> bot_llm::Result<GenerationResponse> {
            match &self.reply {
                Ok(text) => Ok(GenerationResponse {
                    text: text.clone(),
                    usage: None,
                }),
                Err(()) => Err(LLMError::EmptyResponse("no candidates".to_string())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn snapshot() -> FundamentalSnapshot {
        FundamentalSnapshot {
            as_of: NaiveDate::from_ymd_opt(2025, 8, 29).expect("date"),
            per: Some(12.5),
            pbr: Some(1.2),
            eps: Some(5000.0),
            bps: None,
            div_yield: Some(2.1),
            close: Some(71_500),
        }
    }

    fn ticker() -> TickerMatch {
        TickerMatch {
            code: "005930".to_string(),
            name: "삼성전자".to_string(),
            market: Market::Kospi,
        }
    }

    #[test]
    fn test_info_block_contents() {
        let block = stock_info_block(&ticker(), &snapshot());
        assert!(block.contains("■ 종목명: 삼성전자 (005930 / KOSPI)"));
        assert!(block.contains("■ 기준일: 2025-08-29 (최근 영업일)"));
        assert!(block.contains("■ 현재가: 71,500원"));
        assert!(block.contains("■ PER: 12.50배"));
        // Unpublished figures surface as the sentinel, not zero
        assert!(block.contains("■ BPS: 정보없음원"));
        assert!(block.contains("■ 배당수익률: 2.10%"));
    }

    #[test]
    fn test_info_block_unconfirmed_price() {
        let mut snap = snapshot();
        snap.close = None;
        let block = stock_info_block(&ticker(), &snap);
        assert!(block.contains("■ 현재가: 확인불가원"));
    }

    #[test]
    fn test_market_info_line() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).expect("date");
        let line = market_info_line(Some((2655.28, date)));
        assert_eq!(line, "현재 코스피 지수: 2,655 (기준일: 2025-08-29)");
        assert_eq!(market_info_line(None), "시장 지수 조회 실패");
    }

    #[tokio::test]
    async fn test_stock_report_passes_text_through() {
        let composer = ReportComposer::new(Arc::new(FixedProvider {
            reply: Ok("리포트 본문".to_string()),
        }));
        let text = composer.stock_report("삼성전자", "■ PER: 12.50배").await;
        assert_eq!(text, "리포트 본문");
    }

    #[tokio::test]
    async fn test_failure_becomes_inline_note() {
        let composer = ReportComposer::new(Arc::new(FixedProvider { reply: Err(()) }));
        let text = composer.market_report("시장 지수 조회 실패").await;
        assert!(text.starts_with("(AI 응답 오류:"));
    }
}
