//! Per-chat conversational mode
//!
//! Each chat is either idle or waiting for a company name. State is keyed by
//! chat id and lives in memory; a restart simply puts everyone back at the
//! menu.

use std::collections::HashMap;
use std::sync::RwLock;

/// What the bot expects next from a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// No pending interaction; free text just re-shows the menu
    #[default]
    Idle,
    /// The next text message is treated as a company name to analyze
    AwaitingAnalysisInput,
}

/// Storage for per-chat modes
pub trait ModeStore: Send + Sync {
    /// Current mode for a chat; unknown chats are idle
    fn get(&self, chat_id: i64) -> ChatMode;

    /// Replace the mode for a chat
    fn set(&self, chat_id: i64, mode: ChatMode);
}

/// In-memory mode store
#[derive(Debug, Default)]
pub struct InMemoryModeStore {
    modes: RwLock<HashMap<i64, ChatMode>>,
}

impl InMemoryModeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModeStore for InMemoryModeStore {
    fn get(&self, chat_id: i64) -> ChatMode {
        self.modes
            .read()
            .map(|modes| modes.get(&chat_id).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    fn set(&self, chat_id: i64, mode: ChatMode) {
        if let Ok(mut modes) = self.modes.write() {
            modes.insert(chat_id, mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_chat_is_idle() {
        let store = InMemoryModeStore::new();
        assert_eq!(store.get(42), ChatMode::Idle);
    }

    #[test]
    fn test_set_and_get() {
        let store = InMemoryModeStore::new();
        store.set(42, ChatMode::AwaitingAnalysisInput);
        assert_eq!(store.get(42), ChatMode::AwaitingAnalysisInput);
        // Other chats are unaffected
        assert_eq!(store.get(43), ChatMode::Idle);
    }

    #[test]
    fn test_mode_can_be_reset() {
        let store = InMemoryModeStore::new();
        store.set(1, ChatMode::AwaitingAnalysisInput);
        store.set(1, ChatMode::Idle);
        assert_eq!(store.get(1), ChatMode::Idle);
    }
}
