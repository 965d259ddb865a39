//! Navigation shell: active module, settings dialog, status bar, and the
//! system indicator.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use frames::ModuleTag;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    /// Status bar text when no task label is set.
    #[must_use]
    pub fn default_text(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Processing => "Processing...",
            Self::Completed => "Completed",
            Self::Error => "Failed",
        }
    }
}

/// Host resource indicator. CPU and memory are fixed placeholders; only the
/// backend flag is live.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SystemStatus {
    pub backend_connected: bool,
    /// Percent.
    pub cpu_usage: f64,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self { backend_connected: false, cpu_usage: 35.0, memory_used_gb: 8.2, memory_total_gb: 16.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShellAction {
    Navigate(ModuleTag),
    OpenSettings,
    CloseSettings,
    /// Replace the status bar contents.
    SetTask { status: TaskStatus, task: Option<String>, message: Option<String> },
    BackendConnected(bool),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShellState {
    pub active_module: ModuleTag,
    pub settings_open: bool,
    pub task_status: TaskStatus,
    pub current_task: Option<String>,
    pub message: Option<String>,
    pub system: SystemStatus,
}

impl ShellState {
    #[must_use]
    pub fn reduce(mut self, action: ShellAction) -> Self {
        match action {
            ShellAction::Navigate(module) => self.active_module = module,
            ShellAction::OpenSettings => self.settings_open = true,
            ShellAction::CloseSettings => self.settings_open = false,
            ShellAction::SetTask { status, task, message } => {
                self.task_status = status;
                self.current_task = task;
                self.message = message;
            }
            ShellAction::BackendConnected(connected) => self.system.backend_connected = connected,
        }
        self
    }

    /// Current task label if set, else the default text for the status.
    #[must_use]
    pub fn status_text(&self) -> &str {
        match self.current_task.as_deref() {
            Some(task) if !task.is_empty() => task,
            _ => self.task_status.default_text(),
        }
    }

    /// `"<status text> - <message>"` when a message is present.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => format!("{} - {message}", self.status_text()),
            _ => self.status_text().to_string(),
        }
    }
}
