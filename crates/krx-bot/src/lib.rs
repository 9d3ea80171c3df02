//! Korean stock-market chat bot
//!
//! Telegram front end over two backends: the KRX data service for verified
//! market figures and Gemini for report prose. A per-chat mode machine keeps
//! the conversation menu-driven; the only free-text input is the company
//! name asked for by the analysis button.
//!
//! Layering, bottom up:
//!
//! - [`data`] is the market data seam; [`krx_data`] provides the live
//!   implementation
//! - [`resolver`], [`fundamentals`], [`chart`], [`marketmap`] are the
//!   per-feature pipelines
//! - [`report`] turns verified figures into prompts and prose
//! - [`telegram`] is the transport; [`router`] wires everything to updates

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod fundamentals;
pub mod marketmap;
pub mod menu;
pub mod report;
pub mod resolver;
pub mod router;
pub mod session;
pub mod telegram;

pub use config::BotConfig;
pub use data::MarketData;
pub use error::{BotError, Result};
pub use router::Router;
pub use session::{ChatMode, InMemoryModeStore, ModeStore};
pub use telegram::{ChatApi, TelegramClient};
