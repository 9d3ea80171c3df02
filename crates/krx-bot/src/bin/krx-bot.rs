//! Bot entry point: long-poll loop with bounded concurrency

use bot_llm::providers::{GeminiConfig, GeminiProvider};
use bot_llm::LLMProvider;
use krx_bot::report::ReportComposer;
use krx_bot::{BotConfig, InMemoryModeStore, MarketData, ModeStore, Router, TelegramClient};
use krx_data::KrxClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    bot_utils::logging::init_tracing();

    // Missing secrets abort startup here
    let config = BotConfig::from_env()?;

    let provider: Arc<dyn LLMProvider> = Arc::new(GeminiProvider::with_config(
        GeminiConfig::new(&config.google_api_key).with_model(&config.model),
    )?);
    let data: Arc<dyn MarketData> = Arc::new(KrxClient::new()?);
    let telegram = Arc::new(TelegramClient::new(&config.telegram_token)?);
    let modes: Arc<dyn ModeStore> = Arc::new(InMemoryModeStore::new());
    let router = Arc::new(Router::new(
        telegram.clone(),
        data,
        ReportComposer::new(provider),
        modes,
        config.lookback_days,
    ));

    let permits = Arc::new(Semaphore::new(config.concurrent_updates));
    info!(model = %config.model, "krx-bot running");

    // Drop updates that queued up while the bot was down; offset -1 asks for
    // the newest update only
    let mut offset = match telegram.get_updates(-1, 0).await {
        Ok(pending) => pending.last().map_or(0, |update| update.update_id + 1),
        Err(error) => {
            warn!(%error, "could not skip pending updates");
            0
        }
    };
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            polled = telegram.get_updates(offset, config.poll_timeout_secs) => {
                let updates = match polled {
                    Ok(updates) => updates,
                    Err(error) => {
                        warn!(%error, "poll failed, backing off");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        continue;
                    }
                };
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let router = Arc::clone(&router);
                    let permits = Arc::clone(&permits);
                    tokio::spawn(async move {
                        let Ok(_permit) = permits.acquire_owned().await else {
                            return;
                        };
                        router.handle_update(update).await;
                    });
                }
            }
        }
    }

    Ok(())
}
