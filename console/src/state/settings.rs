//! Settings dialog model.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};

use super::params::clamp_resolution;

pub const FONT_SIZE_RANGE: (u32, u32) = (12, 20);
pub const WS_PORT_RANGE: (u32, u32) = (1000, 65535);

/// Path the status server serves its WebSocket on.
pub const STATUS_PATH: &str = "/api/status";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    #[default]
    Interface,
    Processing,
    Advanced,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
    pub font_size: u32,
    pub default_resolution: u32,
    pub cache_path: String,
    pub log_level: LogLevel,
    pub api_endpoint: String,
    pub websocket_port: u32,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            language: Language::Zh,
            font_size: 14,
            default_resolution: 100,
            cache_path: "/tmp/las-cache".to_string(),
            log_level: LogLevel::Info,
            api_endpoint: "http://localhost:8080".to_string(),
            websocket_port: 9001,
            debug_mode: false,
        }
    }
}

impl Settings {
    /// WebSocket URL of the status link: API endpoint host on the WebSocket
    /// port. `https` endpoints map to `wss`.
    #[must_use]
    pub fn status_url(&self) -> String {
        let (scheme, rest) = match self.api_endpoint.split_once("://") {
            Some(("https", rest)) => ("wss", rest),
            Some((_, rest)) => ("ws", rest),
            None => ("ws", self.api_endpoint.as_str()),
        };
        let authority = rest.split('/').next().unwrap_or_default();
        let host = match authority.rsplit_once(':') {
            Some((host, _port)) => host,
            None => authority,
        };
        let host = if host.is_empty() { "localhost" } else { host };
        format!("{scheme}://{host}:{}{STATUS_PATH}", self.websocket_port)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingsAction {
    SelectTab(SettingsTab),
    SetTheme(Theme),
    SetLanguage(Language),
    SetFontSize(u32),
    SetDefaultResolution(u32),
    SetCachePath(String),
    SetLogLevel(LogLevel),
    SetApiEndpoint(String),
    SetWebsocketPort(u32),
    SetDebugMode(bool),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsState {
    pub tab: SettingsTab,
    pub settings: Settings,
}

impl SettingsState {
    #[must_use]
    pub fn reduce(mut self, action: SettingsAction) -> Self {
        let s = &mut self.settings;
        match action {
            SettingsAction::SelectTab(tab) => self.tab = tab,
            SettingsAction::SetTheme(theme) => s.theme = theme,
            SettingsAction::SetLanguage(language) => s.language = language,
            SettingsAction::SetFontSize(size) => s.font_size = size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1),
            SettingsAction::SetDefaultResolution(value) => s.default_resolution = clamp_resolution(value),
            SettingsAction::SetCachePath(path) => s.cache_path = path,
            SettingsAction::SetLogLevel(level) => s.log_level = level,
            SettingsAction::SetApiEndpoint(endpoint) => s.api_endpoint = endpoint,
            SettingsAction::SetWebsocketPort(port) => s.websocket_port = port.clamp(WS_PORT_RANGE.0, WS_PORT_RANGE.1),
            SettingsAction::SetDebugMode(debug) => s.debug_mode = debug,
        }
        self
    }
}
