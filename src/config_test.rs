use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.port, 9001);
    assert_eq!(cfg.status_interval, Duration::from_millis(3000));
    assert_eq!(cfg.task_id, "demo-task");
}

#[test]
fn overrides_are_parsed() {
    let cfg = ServerConfig::from_lookup(lookup(&[
        ("PORT", "9100"),
        ("STATUS_INTERVAL_MS", " 250 "),
        ("STATUS_TASK_ID", "scan-7"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.status_interval, Duration::from_millis(250));
    assert_eq!(cfg.task_id, "scan-7");
}

#[test]
fn invalid_port_is_rejected() {
    let err = ServerConfig::from_lookup(lookup(&[("PORT", "ninety")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "ninety".into() });

    let err = ServerConfig::from_lookup(lookup(&[("PORT", "70000")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
}

#[test]
fn zero_interval_is_rejected() {
    let err = ServerConfig::from_lookup(lookup(&[("STATUS_INTERVAL_MS", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroInterval);
}

#[test]
fn blank_task_id_falls_back() {
    let cfg = ServerConfig::from_lookup(lookup(&[("STATUS_TASK_ID", "   ")])).unwrap();
    assert_eq!(cfg.task_id, "demo-task");
}
