//! Home menu layout

use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Text shown above the home menu buttons
pub const HOME_MENU_TEXT: &str = "메뉴를 선택하세요. (마켓맵은 영역만 캡처하여 전송합니다)";

/// Callback tags carried by the menu buttons
pub mod callback {
    pub const ANALYSIS: &str = "btn_analysis";
    pub const MARKET: &str = "btn_market";
    pub const MAP_KOSPI: &str = "map_kospi";
    pub const MAP_KOSDAQ: &str = "map_kosdaq";
}

/// The four-entry home menu: analysis and market on their own rows, the two
/// market maps sharing one
pub fn home_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::new("📊 기업 분석", callback::ANALYSIS)],
            vec![InlineKeyboardButton::new("📈 시장 현황", callback::MARKET)],
            vec![
                InlineKeyboardButton::new("🗺️ 코스피", callback::MAP_KOSPI),
                InlineKeyboardButton::new("🗺️ 코스닥", callback::MAP_KOSDAQ),
            ],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_layout() {
        let keyboard = home_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), 3);
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
        assert_eq!(keyboard.inline_keyboard[2].len(), 2);
        assert_eq!(keyboard.inline_keyboard[0][0].callback_data, callback::ANALYSIS);
        assert_eq!(keyboard.inline_keyboard[2][1].callback_data, callback::MAP_KOSDAQ);
    }

    #[test]
    fn test_keyboard_serializes_for_the_wire() {
        let value = serde_json::to_value(home_keyboard()).expect("serialize");
        assert_eq!(
            value["inline_keyboard"][1][0]["callback_data"],
            callback::MARKET
        );
        assert_eq!(value["inline_keyboard"][1][0]["text"], "📈 시장 현황");
    }
}
