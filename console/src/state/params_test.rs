use super::*;

#[test]
fn unwrap_defaults() {
    let p = UnwrapParams::default();
    assert_eq!(p.sample_ratio, 0.05);
    assert_eq!(p.resolution, 100);
    assert_eq!(p.deviation_threshold, 0.5);
    assert!(p.save_diagnostic_images);
}

#[test]
fn unwrap_setters_clamp() {
    let p = UnwrapParams::default()
        .with_sample_ratio(5.0)
        .with_resolution(10)
        .with_deviation_threshold(0.0);
    assert_eq!(p.sample_ratio, 1.0);
    assert_eq!(p.resolution, 50);
    assert_eq!(p.deviation_threshold, 0.1);

    let p = p.with_sample_ratio(0.0).with_resolution(9000).with_deviation_threshold(3.5);
    assert_eq!(p.sample_ratio, 0.01);
    assert_eq!(p.resolution, 500);
    assert_eq!(p.deviation_threshold, 2.0);
}

#[test]
fn unwrap_in_range_values_kept() {
    let p = UnwrapParams::default().with_sample_ratio(0.2).with_resolution(250);
    assert_eq!(p.sample_ratio, 0.2);
    assert_eq!(p.resolution, 250);
}

#[test]
fn batch_defaults_and_clamps() {
    let p = BatchParams::default();
    assert_eq!(p.mode, ComputeMode::Cpu);
    assert_eq!(p.worker_count, 4);
    assert_eq!(p.resolution, 100);
    assert!(p.skip_existing);

    let p = p.with_worker_count(0).with_mode(ComputeMode::Gpu);
    assert_eq!(p.worker_count, 1);
    assert_eq!(p.mode.label(), "GPU");
    assert_eq!(p.with_worker_count(64).worker_count, 16);
}

#[test]
fn analysis_defaults() {
    let p = AnalysisParams::default();
    assert_eq!(p.mode, AnalysisMode::Standard);
    assert!(p.features.geometric && p.features.color && p.features.structure);
    assert!(p.gpu_acceleration);
}

#[test]
fn modes_serialize_lowercase() {
    let json = serde_json::to_string(&AnalysisMode::Deep).expect("serialize mode");
    assert_eq!(json, "\"deep\"");
    let json = serde_json::to_string(&ComputeMode::Gpu).expect("serialize mode");
    assert_eq!(json, "\"gpu\"");
}
