//! Shared status-event model and codecs for the backend status link.
//!
//! This crate owns the wire representation used by the status server, the
//! console's channels, and the CLI. Text frames carry JSON shaped as
//! `{"type", "module", "data": {"taskId", "progress", "message", "details"}}`;
//! binary frames carry the same fields over protobuf, with `details` riding
//! as an embedded JSON string so the payload stays open-ended.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WireEvent`.
    #[error("failed to decode protobuf event: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The text (or the embedded details string) is not a valid event.
    #[error("invalid JSON event: {0}")]
    Json(#[from] serde_json::Error),
    /// The `kind` integer on the wire does not map to a known [`EventKind`].
    #[error("invalid event kind: {0}")]
    InvalidKind(i32),
    /// The `module` integer on the wire does not map to a known [`ModuleTag`].
    #[error("invalid module tag: {0}")]
    InvalidModule(i32),
}

/// What an event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Intermediate progress update (non-terminal).
    Progress,
    /// Successful terminal result.
    Result,
    /// Error terminal report.
    Error,
    /// Free-form diagnostic line.
    Log,
}

impl EventKind {
    /// Terminal kinds end a task's event stream.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Result | Self::Error)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Result => "result",
            Self::Error => "error",
            Self::Log => "log",
        }
    }

    /// Convert kind into wire enum integer value.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Progress => WireEventKind::Progress as i32,
            Self::Result => WireEventKind::Result as i32,
            Self::Error => WireEventKind::Error as i32,
            Self::Log => WireEventKind::Log as i32,
        }
    }

    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireEventKind::try_from(value) {
            Ok(WireEventKind::Progress) => Ok(Self::Progress),
            Ok(WireEventKind::Result) => Ok(Self::Result),
            Ok(WireEventKind::Error) => Ok(Self::Error),
            Ok(WireEventKind::Log) => Ok(Self::Log),
            Err(_) => Err(CodecError::InvalidKind(value)),
        }
    }
}

/// Workflow module an event originates from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleTag {
    /// Single-file cylindrical unwrap.
    #[default]
    Unwrap,
    /// Folder-level batch processing.
    Batch,
    /// Deep analysis (features, segmentation).
    Analysis,
}

impl ModuleTag {
    /// All modules in navigation order.
    pub const ALL: [Self; 3] = [Self::Unwrap, Self::Batch, Self::Analysis];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unwrap => "unwrap",
            Self::Batch => "batch",
            Self::Analysis => "analysis",
        }
    }

    /// Navigation label shown for the module.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unwrap => "Tunnel Unwrap",
            Self::Batch => "Batch Processing",
            Self::Analysis => "Deep Analysis",
        }
    }

    /// Convert module into wire enum integer value.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Unwrap => WireModule::Unwrap as i32,
            Self::Batch => WireModule::Batch as i32,
            Self::Analysis => WireModule::Analysis as i32,
        }
    }

    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireModule::try_from(value) {
            Ok(WireModule::Unwrap) => Ok(Self::Unwrap),
            Ok(WireModule::Batch) => Ok(Self::Batch),
            Ok(WireModule::Analysis) => Ok(Self::Analysis),
            Err(_) => Err(CodecError::InvalidModule(value)),
        }
    }
}

/// Task-scoped payload of a status event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// Identifier of the backend task the event belongs to.
    #[serde(rename = "taskId")]
    pub task_id: String,
    /// Task progress percentage.
    pub progress: f64,
    /// Human-readable message.
    pub message: String,
    /// Open-ended details payload. Defaults to an empty object.
    #[serde(default = "empty_details")]
    pub details: Value,
}

/// A single message on the status link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub module: ModuleTag,
    pub data: EventData,
}

fn empty_details() -> Value {
    Value::Object(Map::new())
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl StatusEvent {
    /// Create an event with zero progress, empty message, and empty details.
    pub fn new(kind: EventKind, module: ModuleTag, task_id: impl Into<String>) -> Self {
        Self {
            kind,
            module,
            data: EventData { task_id: task_id.into(), progress: 0.0, message: String::new(), details: empty_details() },
        }
    }

    /// Create a progress event.
    pub fn progress(module: ModuleTag, task_id: impl Into<String>, progress: f64, message: impl Into<String>) -> Self {
        Self::new(EventKind::Progress, module, task_id)
            .with_progress(progress)
            .with_message(message)
    }

    /// Create a result event. Terminal, progress pinned at 100.
    pub fn result(module: ModuleTag, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Result, module, task_id)
            .with_progress(100.0)
            .with_message(message)
    }

    /// Create an error event. Terminal.
    pub fn error(module: ModuleTag, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, module, task_id).with_message(message)
    }

    /// Create a log event.
    pub fn log(module: ModuleTag, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(EventKind::Log, module, task_id).with_message(message)
    }

    #[must_use]
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.data.progress = progress;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.data.message = message.into();
        self
    }

    /// Insert one key into the details object. A non-object details payload
    /// is replaced by a fresh object.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.data.details.is_object() {
            self.data.details = empty_details();
        }
        if let Value::Object(map) = &mut self.data.details {
            map.insert(key.into(), value.into());
        }
        self
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.data.task_id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.data.message
    }
}

// =============================================================================
// CODECS
// =============================================================================

/// Encode an event as a JSON text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the details payload cannot be serialized.
pub fn encode_json(event: &StatusEvent) -> Result<String, CodecError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a JSON text frame into an event.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed or incomplete JSON.
pub fn decode_json(text: &str) -> Result<StatusEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode an event into protobuf bytes.
#[must_use]
pub fn encode_event(event: &StatusEvent) -> Vec<u8> {
    let wire = event_to_wire(event);

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot hit `BufferTooSmall`.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into an event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidKind`] / [`CodecError::InvalidModule`] for
/// out-of-range enum values, and [`CodecError::Json`] when the embedded
/// details string is not valid JSON.
pub fn decode_event(bytes: &[u8]) -> Result<StatusEvent, CodecError> {
    let wire = WireEvent::decode(bytes)?;
    wire_to_event(wire)
}

fn event_to_wire(event: &StatusEvent) -> WireEvent {
    WireEvent {
        kind: event.kind.as_i32(),
        module: event.module.as_i32(),
        task_id: event.data.task_id.clone(),
        progress: event.data.progress,
        message: event.data.message.clone(),
        details_json: event.data.details.to_string(),
    }
}

fn wire_to_event(wire: WireEvent) -> Result<StatusEvent, CodecError> {
    let details = if wire.details_json.is_empty() {
        empty_details()
    } else {
        serde_json::from_str(&wire.details_json)?
    };

    Ok(StatusEvent {
        kind: EventKind::from_i32(wire.kind)?,
        module: ModuleTag::from_i32(wire.module)?,
        data: EventData { task_id: wire.task_id, progress: wire.progress, message: wire.message, details },
    })
}

#[derive(Clone, PartialEq, Message)]
struct WireEvent {
    #[prost(enumeration = "WireEventKind", tag = "1")]
    kind: i32,
    #[prost(enumeration = "WireModule", tag = "2")]
    module: i32,
    #[prost(string, tag = "3")]
    task_id: String,
    #[prost(double, tag = "4")]
    progress: f64,
    #[prost(string, tag = "5")]
    message: String,
    #[prost(string, tag = "6")]
    details_json: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireEventKind {
    Progress = 0,
    Result = 1,
    Error = 2,
    Log = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireModule {
    Unwrap = 0,
    Batch = 1,
    Analysis = 2,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
