use super::*;

#[test]
fn defaults() {
    let shell = ShellState::default();
    assert_eq!(shell.active_module, ModuleTag::Unwrap);
    assert!(!shell.settings_open);
    assert_eq!(shell.task_status, TaskStatus::Idle);
    assert!(!shell.system.backend_connected);
    assert_eq!(shell.system.cpu_usage, 35.0);
    assert_eq!(shell.system.memory_used_gb, 8.2);
    assert_eq!(shell.system.memory_total_gb, 16.0);
}

#[test]
fn status_text_falls_back_per_status() {
    let cases = [
        (TaskStatus::Idle, "Ready"),
        (TaskStatus::Processing, "Processing..."),
        (TaskStatus::Completed, "Completed"),
        (TaskStatus::Error, "Failed"),
    ];
    for (status, expected) in cases {
        let shell = ShellState::default().reduce(ShellAction::SetTask { status, task: None, message: None });
        assert_eq!(shell.status_text(), expected);
    }
}

#[test]
fn status_text_prefers_task_label() {
    let shell = ShellState::default().reduce(ShellAction::SetTask {
        status: TaskStatus::Processing,
        task: Some("Fitting cylinder".into()),
        message: Some("tunnel.las".into()),
    });
    assert_eq!(shell.status_text(), "Fitting cylinder");
    assert_eq!(shell.status_line(), "Fitting cylinder - tunnel.las");
}

#[test]
fn empty_task_label_uses_default() {
    let shell = ShellState::default().reduce(ShellAction::SetTask {
        status: TaskStatus::Completed,
        task: Some(String::new()),
        message: None,
    });
    assert_eq!(shell.status_line(), "Completed");
}

#[test]
fn navigation_and_settings_toggle() {
    let shell = ShellState::default()
        .reduce(ShellAction::Navigate(ModuleTag::Analysis))
        .reduce(ShellAction::OpenSettings);
    assert_eq!(shell.active_module, ModuleTag::Analysis);
    assert!(shell.settings_open);

    let shell = shell.reduce(ShellAction::CloseSettings).reduce(ShellAction::BackendConnected(true));
    assert!(!shell.settings_open);
    assert!(shell.system.backend_connected);
}
