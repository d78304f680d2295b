//! Localized chat-UI strings.
//!
//! Only operator-facing replies are localized; issue and alert notifications
//! keep a fixed format.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `ChatTranslation` used across Herald components.
pub struct ChatTranslation {
    pub greeting: &'static str,
    pub muted_until: &'static str,
    pub unmuted: &'static str,
    pub not_muted: &'static str,
    pub your_user_id: &'static str,
    pub no_active_alerts: &'static str,
    pub alerts_not_configured: &'static str,
}

pub const EN: ChatTranslation = ChatTranslation {
    greeting: "Telegram bot for Jira welcomes you!",
    muted_until: "Muted until",
    unmuted: "Unmuted",
    not_muted: "Oh, I am not muted!",
    your_user_id: "Your UserID is",
    no_active_alerts: "No active alerts",
    alerts_not_configured: "Alertmanager endpoint is not configured",
};

pub const RU: ChatTranslation = ChatTranslation {
    greeting: "Вас приветствует телеграм бот Jira!",
    muted_until: "Без звука до",
    unmuted: "Звук включён",
    not_muted: "Я и так не на беззвучном!",
    your_user_id: "Ваш UserID:",
    no_active_alerts: "Активных алертов нет",
    alerts_not_configured: "Адрес Alertmanager не настроен",
};

/// Picks the translation for a Telegram `language_code`, defaulting to English.
pub fn translation_for(language_code: Option<&str>) -> &'static ChatTranslation {
    let Some(code) = language_code.map(str::trim).filter(|code| !code.is_empty()) else {
        return &EN;
    };
    let primary = code.split(['-', '_']).next().unwrap_or(code);
    if primary.eq_ignore_ascii_case("ru") {
        &RU
    } else {
        &EN
    }
}
