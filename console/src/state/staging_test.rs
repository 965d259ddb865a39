use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct FakeEvent {
    files: Vec<CandidateFile>,
    prevented: bool,
}

impl FakeEvent {
    fn new(files: Vec<CandidateFile>) -> Self {
        Self { files, prevented: false }
    }
}

impl DropEvent for FakeEvent {
    fn prevent_default(&mut self) {
        self.prevented = true;
    }

    fn files(&self) -> Vec<CandidateFile> {
        self.files.clone()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn names(state: &StagingState) -> Vec<&str> {
    state.files.iter().map(|f| f.name.as_str()).collect()
}

// =============================================================
// Validation
// =============================================================

#[test]
fn accepts_las_and_laz_case_insensitive() {
    assert!(is_point_cloud_name("tunnel.las"));
    assert!(is_point_cloud_name("TUNNEL.LAZ"));
    assert!(is_point_cloud_name("a.b.LaS"));
    assert!(!is_point_cloud_name("scan.txt"));
    assert!(!is_point_cloud_name("las"));
    assert!(!is_point_cloud_name("tunnel.las.bak"));
}

#[test]
fn add_files_keeps_only_point_clouds_in_order() {
    let mut rng = rng();
    let candidates = vec![
        CandidateFile::new("b.LAZ", 1),
        CandidateFile::new("notes.txt", 2),
        CandidateFile::new("a.las", 3),
        CandidateFile::new("image.png", 4),
    ];

    let state = add_files(StagingState::default(), candidates, &mut rng);

    assert_eq!(names(&state), vec!["b.LAZ", "a.las"]);
}

#[test]
fn add_files_appends_without_dedup() {
    let mut rng = rng();
    let state = add_files(StagingState::default(), vec![CandidateFile::new("x.las", 1)], &mut rng);
    let state = add_files(state, vec![CandidateFile::new("x.las", 1)], &mut rng);

    assert_eq!(names(&state), vec!["x.las", "x.las"]);
}

#[test]
fn reducer_rejects_hand_built_records_with_wrong_extension() {
    let mut rng = rng();
    let bad = synthesize(CandidateFile::new("scan.txt", 1), &mut rng);
    let state = StagingState::default().reduce(StagingAction::Add(vec![bad]));
    assert!(state.is_empty());
}

// =============================================================
// Synthesized metadata
// =============================================================

#[test]
fn synthesized_metadata_stays_in_range() {
    let mut rng = rng();
    for i in 0..200 {
        let file = synthesize(CandidateFile::new(format!("f{i}.las"), 10), &mut rng);
        assert!((POINT_COUNT_MIN..POINT_COUNT_MAX).contains(&file.point_count));
        assert!((0.0..100.0).contains(&file.bounds.min.x));
        assert!((0.0..100.0).contains(&file.bounds.min.y));
        assert_eq!(file.bounds.min.z, 0.0);
        assert!((100.0..200.0).contains(&file.bounds.max.x));
        assert!((100.0..200.0).contains(&file.bounds.max.y));
        assert!((10.0..60.0).contains(&file.bounds.max.z));
        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.progress, 0.0);
        assert!(file.error.is_none());
    }
}

#[test]
fn bounds_extent_is_positive() {
    let mut rng = rng();
    let file = synthesize(CandidateFile::new("t.las", 1), &mut rng);
    let extent = file.bounds.extent();
    assert!(extent.x > 0.0 && extent.y > 0.0 && extent.z > 0.0);
}

#[test]
fn tunnel_scenario_point_count_in_range() {
    let mut rng = rng();
    let state = add_files(
        StagingState::default(),
        vec![CandidateFile::new("tunnel.las", 10 * 1024 * 1024)],
        &mut rng,
    );
    let file = state.selected().expect("tunnel.las should be staged");
    assert_eq!(file.size, 10 * 1024 * 1024);
    assert!(file.point_count >= 1_000_000 && file.point_count < 11_000_000);
}

// =============================================================
// Remove / update
// =============================================================

#[test]
fn remove_deletes_every_match_and_keeps_order() {
    let mut rng = rng();
    let state = add_files(
        StagingState::default(),
        ["a.las", "dup.las", "b.las", "dup.las", "c.laz"]
            .into_iter()
            .map(|n| CandidateFile::new(n, 1))
            .collect(),
        &mut rng,
    );

    let state = state.reduce(StagingAction::Remove("dup.las".into()));

    assert_eq!(names(&state), vec!["a.las", "b.las", "c.laz"]);
}

#[test]
fn remove_unknown_name_is_noop() {
    let mut rng = rng();
    let state = add_files(StagingState::default(), vec![CandidateFile::new("a.las", 1)], &mut rng);
    let before = state.clone();
    let state = state.reduce(StagingAction::Remove("zzz.las".into()));
    assert_eq!(state, before);
}

#[test]
fn update_status_replaces_in_place() {
    let mut rng = rng();
    let state = add_files(
        StagingState::default(),
        vec![CandidateFile::new("a.las", 1), CandidateFile::new("b.las", 1)],
        &mut rng,
    );

    let state = state.reduce(StagingAction::UpdateStatus {
        name: "b.las".into(),
        status: FileStatus::Error,
        progress: Some(40.0),
        error: Some("insufficient memory".into()),
    });

    assert_eq!(names(&state), vec!["a.las", "b.las"]);
    let b = &state.files[1];
    assert_eq!(b.status, FileStatus::Error);
    assert_eq!(b.progress, 40.0);
    assert_eq!(b.error.as_deref(), Some("insufficient memory"));
    assert_eq!(state.files[0].status, FileStatus::Pending);
}

#[test]
fn update_status_without_progress_keeps_previous_progress() {
    let mut rng = rng();
    let state = add_files(StagingState::default(), vec![CandidateFile::new("a.las", 1)], &mut rng)
        .reduce(StagingAction::UpdateStatus {
            name: "a.las".into(),
            status: FileStatus::Processing,
            progress: Some(55.0),
            error: None,
        })
        .reduce(StagingAction::UpdateStatus {
            name: "a.las".into(),
            status: FileStatus::Completed,
            progress: None,
            error: None,
        });

    assert_eq!(state.files[0].status, FileStatus::Completed);
    assert_eq!(state.files[0].progress, 55.0);
}

#[test]
fn update_status_for_absent_name_is_noop() {
    let state = StagingState::default().reduce(StagingAction::UpdateStatus {
        name: "ghost.las".into(),
        status: FileStatus::Completed,
        progress: Some(100.0),
        error: None,
    });
    assert!(state.is_empty());
}

// =============================================================
// Drag and drop
// =============================================================

#[test]
fn drag_over_and_leave_toggle_indicator_and_prevent_default() {
    let mut over = FakeEvent::new(vec![]);
    let state = handle_drag_over(StagingState::default(), &mut over);
    assert!(state.dragging);
    assert!(over.prevented);

    let mut leave = FakeEvent::new(vec![]);
    let state = handle_drag_leave(state, &mut leave);
    assert!(!state.dragging);
    assert!(leave.prevented);
}

#[test]
fn drop_clears_indicator_and_stages_files() {
    let mut rng = rng();
    let state = StagingState { dragging: true, ..StagingState::default() };
    let mut event = FakeEvent::new(vec![CandidateFile::new("scan.LAS", 5), CandidateFile::new("readme.md", 1)]);

    let state = handle_drop(state, &mut event, &mut rng);

    assert!(event.prevented);
    assert!(!state.dragging);
    assert_eq!(names(&state), vec!["scan.LAS"]);
}

#[test]
fn dropping_text_file_leaves_list_empty() {
    let mut rng = rng();
    let mut event = FakeEvent::new(vec![CandidateFile::new("scan.txt", 5)]);
    let state = handle_drop(StagingState::default(), &mut event, &mut rng);
    assert!(state.is_empty());
    assert_eq!(state.len(), 0);
}

#[test]
fn file_status_labels() {
    assert_eq!(FileStatus::default(), FileStatus::Pending);
    assert_eq!(FileStatus::Pending.label(), "Waiting");
    assert_eq!(FileStatus::Error.label(), "Error");
}
