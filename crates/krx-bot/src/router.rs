//! Update routing
//!
//! Connects the transport, the per-chat mode machine, market data, and the
//! report composer. Failures never reach the user as raw errors: backend
//! problems become short Korean notices, everything else is logged and
//! swallowed.

use crate::chart;
use crate::data::MarketData;
use crate::error::Result;
use crate::fundamentals::{self, FetchOutcome, KOSPI_INDEX_CODE};
use crate::marketmap;
use crate::menu::{self, callback};
use crate::report::{self, ReportComposer};
use crate::resolver::{self, Resolution};
use crate::session::{ChatMode, ModeStore};
use crate::telegram::{CallbackQuery, ChatApi, Message, MessageOptions, Update};
use chrono::{Local, NaiveDate};
use krx_data::Market;
use std::sync::Arc;
use tracing::{error, warn};

const ANALYSIS_PROMPT_TEXT: &str =
    "🔍 KRX에서 분석할 <b>정확한 종목명</b>을 입력해주세요.\n(예: 삼성전자, NAVER, 에코프로비엠)";

const EMPTY_INPUT_TEXT: &str = "정확한 종목명을 입력해주세요. (예: 삼성전자, NAVER, 에코프로비엠)";

const NOT_FOUND_TEXT: &str = "KRX에 등록된 정확한 종목명을 입력해주세요.";

const NO_RECENT_DATA_TEXT: &str = "최근 데이터를 찾을 수 없습니다. (거래정지/휴장 가능)";

const CHART_FAILED_TEXT: &str = "차트 생성에 실패했습니다.";

/// Routes one update at a time; shared across handler tasks
pub struct Router {
    chat: Arc<dyn ChatApi>,
    data: Arc<dyn MarketData>,
    composer: ReportComposer,
    modes: Arc<dyn ModeStore>,
    lookback_days: i64,
}

impl Router {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        data: Arc<dyn MarketData>,
        composer: ReportComposer,
        modes: Arc<dyn ModeStore>,
        lookback_days: i64,
    ) -> Self {
        Self {
            chat,
            data,
            composer,
            modes,
            lookback_days,
        }
    }

    /// Handle one update, absorbing any error. The user is deliberately not
    /// messaged about transport or handler failures.
    pub async fn handle_update(&self, update: Update) {
        let update_id = update.update_id;
        if let Err(e) = self.dispatch(update).await {
            error!(update_id, error = %e, "update handling failed");
        }
    }

    async fn dispatch(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            let chat_id = message.chat.id;
            let text = message.text.unwrap_or_default();
            let text = text.trim();
            if text == "/start" {
                return self.show_home(chat_id).await;
            }
            // Other commands are not ours; they must never reach the
            // analysis pipeline as a company name
            if text.starts_with('/') {
                return Ok(());
            }
            return self.handle_text(chat_id, text).await;
        }
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        Ok(())
    }

    async fn handle_text(&self, chat_id: i64, text: &str) -> Result<()> {
        match self.modes.get(chat_id) {
            ChatMode::Idle => self.show_home(chat_id).await,
            ChatMode::AwaitingAnalysisInput => {
                // One shot per prompt: the mode drops before the pipeline
                // runs, whatever its outcome
                self.modes.set(chat_id, ChatMode::Idle);
                self.run_analysis(chat_id, text).await
            }
        }
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        if let Err(e) = self.chat.answer_callback(&query.id).await {
            warn!(error = %e, "callback acknowledgement failed");
        }
        let Some(Message {
            message_id,
            chat,
            ..
        }) = query.message
        else {
            return Ok(());
        };
        let chat_id = chat.id;
        match query.data.as_deref() {
            Some(callback::ANALYSIS) => {
                self.modes.set(chat_id, ChatMode::AwaitingAnalysisInput);
                self.chat
                    .edit_message(chat_id, message_id, ANALYSIS_PROMPT_TEXT, MessageOptions::html())
                    .await
            }
            Some(callback::MARKET) => self.run_market_report(chat_id, message_id).await,
            Some(callback::MAP_KOSPI) => {
                self.run_market_map(chat_id, message_id, Market::Kospi).await
            }
            Some(callback::MAP_KOSDAQ) => {
                self.run_market_map(chat_id, message_id, Market::Kosdaq).await
            }
            _ => Ok(()),
        }
    }

    async fn show_home(&self, chat_id: i64) -> Result<()> {
        self.modes.set(chat_id, ChatMode::Idle);
        self.chat
            .send_message(
                chat_id,
                menu::HOME_MENU_TEXT,
                MessageOptions::with_keyboard(menu::home_keyboard()),
            )
            .await?;
        Ok(())
    }

    /// Full analysis pipeline: resolve, fetch, chart, report. Always ends at
    /// the home menu.
    async fn run_analysis(&self, chat_id: i64, input: &str) -> Result<()> {
        let placeholder = self
            .chat
            .send_message(
                chat_id,
                &format!("🔍 '{input}' KRX 데이터 조회 중...\n(잠시만 기다려주세요)"),
                MessageOptions::default(),
            )
            .await?;
        let progress_id = placeholder.message_id;

        let ticker = match resolver::resolve(self.data.as_ref(), input).await {
            Ok(Resolution::Match(ticker)) => ticker,
            Ok(Resolution::EmptyInput) => {
                return self.finish_with_notice(chat_id, progress_id, EMPTY_INPUT_TEXT).await;
            }
            Ok(Resolution::NotFound) => {
                return self.finish_with_notice(chat_id, progress_id, NOT_FOUND_TEXT).await;
            }
            Ok(Resolution::Suggestions(names)) => {
                let notice = format!("혹시 이 중에 있나요? {}", names.join(", "));
                return self.finish_with_notice(chat_id, progress_id, &notice).await;
            }
            Err(e) => {
                warn!(error = %e, "ticker resolution failed");
                let notice = format!("KRX 데이터 접속 오류: {e}");
                return self.finish_with_notice(chat_id, progress_id, &notice).await;
            }
        };

        let today = Local::now().date_naive();
        let snapshot = match fundamentals::fetch_latest(
            self.data.as_ref(),
            &ticker.code,
            today,
            self.lookback_days,
        )
        .await
        {
            Ok(FetchOutcome::Snapshot(snapshot)) => snapshot,
            Ok(FetchOutcome::NoData) => {
                return self
                    .finish_with_notice(chat_id, progress_id, NO_RECENT_DATA_TEXT)
                    .await;
            }
            Err(e) => {
                warn!(code = %ticker.code, error = %e, "fundamentals fetch failed");
                let notice = format!("KRX 데이터 접속 오류: {e}");
                return self.finish_with_notice(chat_id, progress_id, &notice).await;
            }
        };

        let info = report::stock_info_block(&ticker, &snapshot);
        self.chat
            .edit_message(
                chat_id,
                progress_id,
                &format!("✅ 데이터 확보 완료!\n\n{info}\n\n🖼️ 일봉 차트 생성 중..."),
                MessageOptions::html(),
            )
            .await?;

        self.send_chart(chat_id, &ticker.code, &ticker.name, today).await;

        let text = self.composer.stock_report(&ticker.name, &info).await;
        self.chat
            .send_message(chat_id, &text, MessageOptions::default())
            .await?;
        self.show_home(chat_id).await
    }

    /// Chart delivery is best effort; a failed render or upload becomes a
    /// one-line notice
    async fn send_chart(&self, chat_id: i64, code: &str, name: &str, today: NaiveDate) {
        if let Some(png) = chart::render_daily_chart(self.data.as_ref(), code, today).await {
            let caption = format!("📈 {name} 일봉 차트");
            match self.chat.send_photo(chat_id, png, &caption).await {
                Ok(()) => return,
                Err(e) => warn!(code, error = %e, "chart upload failed"),
            }
        }
        if let Err(e) = self
            .chat
            .send_message(chat_id, CHART_FAILED_TEXT, MessageOptions::default())
            .await
        {
            warn!(error = %e, "chart failure notice not delivered");
        }
    }

    async fn run_market_report(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.chat
            .edit_message(
                chat_id,
                message_id,
                "📈 KRX 시장 데이터 분석 중...",
                MessageOptions::default(),
            )
            .await?;

        let index_close = match fundamentals::recent_index_close(
            self.data.as_ref(),
            KOSPI_INDEX_CODE,
            Local::now().date_naive(),
            self.lookback_days,
        )
        .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "index close lookup failed");
                None
            }
        };

        let market_info = report::market_info_line(index_close);
        let text = self.composer.market_report(&market_info).await;
        self.chat
            .send_message(chat_id, &text, MessageOptions::default())
            .await?;
        self.show_home(chat_id).await
    }

    async fn run_market_map(&self, chat_id: i64, message_id: i64, market: Market) -> Result<()> {
        self.chat
            .edit_message(
                chat_id,
                message_id,
                &format!("🗺️ {market} 마켓맵 렌더링 중... 잠시만요."),
                MessageOptions::default(),
            )
            .await?;

        let url = marketmap::page_url(market);
        match marketmap::capture(market).await {
            Some(image) => {
                let caption = format!("{market} 마켓맵 (출처: 한국경제)\n{url}");
                if let Err(e) = self.chat.send_photo(chat_id, image, &caption).await {
                    warn!(%market, error = %e, "market map upload failed");
                    self.chat
                        .send_message(
                            chat_id,
                            &format!("이미지 전송 지연으로 링크로 안내합니다: {url}"),
                            MessageOptions::default(),
                        )
                        .await?;
                }
            }
            None => {
                self.chat
                    .send_message(
                        chat_id,
                        &format!("마켓맵 이미지를 생성하지 못했습니다. 링크로 확인해주세요:\n{url}"),
                        MessageOptions::default(),
                    )
                    .await?;
            }
        }
        self.show_home(chat_id).await
    }

    /// Replace the progress message with a short notice and land back on the
    /// home menu
    async fn finish_with_notice(&self, chat_id: i64, message_id: i64, notice: &str) -> Result<()> {
        self.chat
            .edit_message(chat_id, message_id, notice, MessageOptions::default())
            .await?;
        self.show_home(chat_id).await
    }
}
