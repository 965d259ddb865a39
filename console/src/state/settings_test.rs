use super::*;

#[test]
fn defaults() {
    let s = Settings::default();
    assert_eq!(s.theme, Theme::Dark);
    assert_eq!(s.language, Language::Zh);
    assert_eq!(s.font_size, 14);
    assert_eq!(s.default_resolution, 100);
    assert_eq!(s.cache_path, "/tmp/las-cache");
    assert_eq!(s.log_level, LogLevel::Info);
    assert_eq!(s.api_endpoint, "http://localhost:8080");
    assert_eq!(s.websocket_port, 9001);
    assert!(!s.debug_mode);
}

#[test]
fn default_status_url() {
    assert_eq!(Settings::default().status_url(), "ws://localhost:9001/api/status");
}

#[test]
fn status_url_follows_endpoint_and_port() {
    let state = SettingsState::default()
        .reduce(SettingsAction::SetApiEndpoint("https://scanner.lab:8443/api".into()))
        .reduce(SettingsAction::SetWebsocketPort(7000));
    assert_eq!(state.settings.status_url(), "wss://scanner.lab:7000/api/status");

    let state = state.reduce(SettingsAction::SetApiEndpoint("10.0.0.5".into()));
    assert_eq!(state.settings.status_url(), "ws://10.0.0.5:7000/api/status");
}

#[test]
fn numeric_settings_clamp() {
    let state = SettingsState::default()
        .reduce(SettingsAction::SetFontSize(40))
        .reduce(SettingsAction::SetDefaultResolution(1))
        .reduce(SettingsAction::SetWebsocketPort(80));
    assert_eq!(state.settings.font_size, 20);
    assert_eq!(state.settings.default_resolution, 50);
    assert_eq!(state.settings.websocket_port, 1000);

    let state = state.reduce(SettingsAction::SetWebsocketPort(70_000)).reduce(SettingsAction::SetFontSize(2));
    assert_eq!(state.settings.websocket_port, 65535);
    assert_eq!(state.settings.font_size, 12);
}

#[test]
fn tab_and_enums() {
    let state = SettingsState::default()
        .reduce(SettingsAction::SelectTab(SettingsTab::Advanced))
        .reduce(SettingsAction::SetTheme(Theme::Auto))
        .reduce(SettingsAction::SetLanguage(Language::En))
        .reduce(SettingsAction::SetLogLevel(LogLevel::Warning))
        .reduce(SettingsAction::SetDebugMode(true))
        .reduce(SettingsAction::SetCachePath("/var/cache/las".into()));
    assert_eq!(state.tab, SettingsTab::Advanced);
    assert_eq!(state.settings.theme, Theme::Auto);
    assert_eq!(state.settings.language, Language::En);
    assert_eq!(state.settings.log_level.as_tracing(), tracing::Level::WARN);
    assert!(state.settings.debug_mode);
    assert_eq!(state.settings.cache_path, "/var/cache/las");
}
