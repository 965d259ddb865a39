use super::*;

fn sample_event() -> StatusEvent {
    StatusEvent::progress(ModuleTag::Unwrap, "demo-task", 42.5, "Processing...")
        .with_detail("stage", "fit-cylinder")
        .with_detail("nested", serde_json::json!({"radius": 3.25, "ok": true}))
}

#[test]
fn kind_numeric_mapping_matches_wire_enum() {
    assert_eq!(EventKind::Progress.as_i32(), 0);
    assert_eq!(EventKind::Result.as_i32(), 1);
    assert_eq!(EventKind::Error.as_i32(), 2);
    assert_eq!(EventKind::Log.as_i32(), 3);
}

#[test]
fn module_numeric_mapping_matches_wire_enum() {
    assert_eq!(ModuleTag::Unwrap.as_i32(), 0);
    assert_eq!(ModuleTag::Batch.as_i32(), 1);
    assert_eq!(ModuleTag::Analysis.as_i32(), 2);
}

#[test]
fn kind_from_wire_rejects_out_of_range_value() {
    let err = EventKind::from_i32(99).expect_err("kind should be invalid");
    assert!(matches!(err, CodecError::InvalidKind(99)));
}

#[test]
fn terminal_kinds_are_result_and_error() {
    assert!(EventKind::Result.is_terminal());
    assert!(EventKind::Error.is_terminal());
    assert!(!EventKind::Progress.is_terminal());
    assert!(!EventKind::Log.is_terminal());
}

#[test]
fn new_event_has_empty_details_object() {
    let event = StatusEvent::new(EventKind::Log, ModuleTag::Batch, "t-1");
    assert_eq!(event.data.details, serde_json::json!({}));
    assert_eq!(event.data.progress, 0.0);
    assert!(event.message().is_empty());
}

#[test]
fn result_pins_progress_at_hundred() {
    let event = StatusEvent::result(ModuleTag::Analysis, "t-2", "done");
    assert_eq!(event.kind, EventKind::Result);
    assert_eq!(event.data.progress, 100.0);
    assert_eq!(event.task_id(), "t-2");
}

#[test]
fn with_detail_replaces_non_object_details() {
    let mut event = StatusEvent::log(ModuleTag::Unwrap, "t", "m");
    event.data.details = serde_json::json!([1, 2]);
    let event = event.with_detail("k", "v");
    assert_eq!(event.data.details, serde_json::json!({"k": "v"}));
}

#[test]
fn json_uses_original_wire_shape() {
    let event = StatusEvent::progress(ModuleTag::Unwrap, "demo-task", 10.0, "Processing...");
    let value: Value = serde_json::from_str(&encode_json(&event).expect("encode")).expect("parse");

    assert_eq!(value["type"], "progress");
    assert_eq!(value["module"], "unwrap");
    assert_eq!(value["data"]["taskId"], "demo-task");
    assert_eq!(value["data"]["progress"], 10.0);
    assert_eq!(value["data"]["message"], "Processing...");
    assert_eq!(value["data"]["details"], serde_json::json!({}));
}

#[test]
fn decode_json_defaults_missing_details() {
    let text = r#"{"type":"log","module":"batch","data":{"taskId":"x","progress":0,"message":"hi"}}"#;
    let event = decode_json(text).expect("decode");
    assert_eq!(event.kind, EventKind::Log);
    assert_eq!(event.module, ModuleTag::Batch);
    assert_eq!(event.data.details, serde_json::json!({}));
}

#[test]
fn decode_json_rejects_unknown_kind() {
    let text = r#"{"type":"bogus","module":"batch","data":{"taskId":"x","progress":0,"message":""}}"#;
    let err = decode_json(text).expect_err("kind should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn protobuf_round_trip_preserves_event() {
    let event = sample_event();
    let bytes = encode_event(&event);
    assert!(!bytes.is_empty());
    let decoded = decode_event(&bytes).expect("decode should succeed");
    assert_eq!(decoded, event);
}

#[test]
fn decode_event_rejects_malformed_bytes() {
    let err = decode_event(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_event_rejects_invalid_wire_module() {
    let wire = WireEvent {
        kind: 0,
        module: 42,
        task_id: "t".to_owned(),
        progress: 1.0,
        message: String::new(),
        details_json: "{}".to_owned(),
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let err = decode_event(&bytes).expect_err("module should fail");
    assert!(matches!(err, CodecError::InvalidModule(42)));
}

#[test]
fn decode_event_defaults_empty_details_string() {
    let wire = WireEvent {
        kind: EventKind::Log.as_i32(),
        module: ModuleTag::Analysis.as_i32(),
        task_id: "t".to_owned(),
        progress: 0.0,
        message: "m".to_owned(),
        details_json: String::new(),
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let event = decode_event(&bytes).expect("decode");
    assert_eq!(event.data.details, serde_json::json!({}));
}

#[test]
fn decode_event_rejects_corrupt_details_string() {
    let wire = WireEvent {
        kind: 0,
        module: 0,
        task_id: "t".to_owned(),
        progress: 0.0,
        message: String::new(),
        details_json: "{not json".to_owned(),
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let err = decode_event(&bytes).expect_err("details should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn module_labels_cover_navigation_order() {
    let labels: Vec<&str> = ModuleTag::ALL.iter().map(|m| m.as_str()).collect();
    assert_eq!(labels, vec!["unwrap", "batch", "analysis"]);
    assert_eq!(ModuleTag::default(), ModuleTag::Unwrap);
}
