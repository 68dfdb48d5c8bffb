//! End-to-end runs of the standard pipeline against `MemoryHost`.

mod common;

use std::collections::BTreeSet;

use serde_json::json;

use autoproj_core::config::{OnExistingProject, OnExistingSequence};
use autoproj_core::host::HostProject;
use autoproj_core::logging::{LogLevel, LOG_BANNER};
use autoproj_core::orchestrator::{Orchestrator, PipelineError, ProjectAction, SequenceStatus};
use autoproj_core::timeline::Ticks;

use common::{entry, RecordingHost, Workspace};

const SEQUENCE_BIN: [&str; 3] = ["Master Bin", "Sequences", "Intro"];

fn intro_manifest() -> serde_json::Value {
    json!({
        "sections": [
            {"section": "Intro", "sequences": [entry("a.mp4", "s1.jpg", "s2.jpg", "Intro_01")]}
        ]
    })
}

fn intro_workspace() -> Workspace {
    let ws = Workspace::new();
    ws.add_videos(&["a.mp4"]);
    ws.add_slides(&["s1.jpg", "s2.jpg"]);
    ws.write_manifest(&intro_manifest());
    ws
}

// ============ Manifest validation ============

#[test]
fn invalid_manifest_makes_no_host_calls() {
    let cases = [
        "not json at all",
        r#"{"sections": []}"#,
        r#"{"sections": "Intro"}"#,
        r#"{"sections": [{"section": "Intro", "sequences": [
            {"video": "a.mp4", "startSlide": "s1.jpg", "endSlide": "s2.jpg"}
        ]}]}"#,
        r#"{"sections": [{"section": "", "sequences": []}]}"#,
    ];

    for text in cases {
        let ws = Workspace::new();
        ws.add_videos(&["a.mp4"]);
        ws.write_manifest_text(text);
        let mut host = RecordingHost::new();

        let (result, logger) = ws.run(&mut host);

        let err = result.unwrap_err();
        assert!(err.is_manifest_error(), "{}: {}", text, err);
        assert!(host.calls().is_empty(), "{}: {:?}", text, host.calls());
        assert_eq!(logger.count(LogLevel::Error), 1);
        assert!(!ws.settings.project_file().exists());
    }
}

#[test]
fn missing_manifest_file_is_fatal_before_host_calls() {
    let ws = Workspace::new();
    let mut host = RecordingHost::new();

    let (result, _) = ws.run(&mut host);

    assert!(result.unwrap_err().is_manifest_error());
    assert!(host.calls().is_empty());
    assert!(!ws.log_text().contains("=== Project Automation Completed ==="));
}

#[test]
fn cancelled_run_makes_no_host_calls() {
    let ws = intro_workspace();
    let mut host = RecordingHost::new();
    let orchestrator = Orchestrator::new(ws.settings.clone(), ws.logger());
    orchestrator.cancel_handle().cancel();

    let err = orchestrator.run(&mut host).unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled { .. }));
    assert!(host.calls().is_empty());
}

// ============ End to end ============

#[test]
fn builds_intro_sequence_framed_by_slides() {
    let ws = intro_workspace();
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(report.project, Some(ProjectAction::Created));
    assert_eq!(report.count("built"), 1);
    assert_eq!(
        report.outcomes[0].status,
        SequenceStatus::Built {
            clips: 3,
            duration: Ticks::from_secs(39),
        }
    );

    let sequence = host
        .resolve(&["Master Bin", "Sequences", "Intro", "Intro_01"])
        .unwrap();
    let layout = host.inner.track_layout(sequence).unwrap();
    layout.check().unwrap();

    let video: Vec<(&str, Ticks)> = layout.video[0]
        .clips
        .iter()
        .map(|c| (c.name.as_str(), c.start))
        .collect();
    assert_eq!(
        video,
        vec![
            ("s1.jpg", Ticks::ZERO),
            ("a.mp4", Ticks::from_secs(5)),
            ("s2.jpg", Ticks::from_secs(35)),
        ]
    );
    // Slides carry no audio; the video's audio moved with its picture.
    assert_eq!(layout.audio[0].clips.len(), 1);
    assert_eq!(layout.audio[0].clips[0].start, Ticks::from_secs(5));
    assert_eq!(
        layout.end(),
        Ticks::from_secs(5) + Ticks::from_secs(30) + Ticks::from_secs(4)
    );

    assert_eq!(logger.count(LogLevel::Warning), 0);
    assert_eq!(logger.count(LogLevel::Error), 0);
    assert!(ws.settings.project_file().exists());

    let log = ws.log_text();
    assert!(log.starts_with(LOG_BANNER));
    assert!(log.contains("=== Project Automation Script Started ==="));
    assert!(log.contains("Sequence 'Intro_01' created successfully."));
    assert!(log.trim_end().ends_with("=== Project Automation Completed ==="));
}

#[test]
fn saved_project_reopens_with_the_sequence() {
    let ws = intro_workspace();
    let mut host = RecordingHost::new();
    ws.run(&mut host).0.unwrap();

    let mut reopened = RecordingHost::new();
    reopened
        .open_document(&ws.settings.project_file())
        .unwrap();

    assert_eq!(reopened.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
    assert_eq!(
        reopened.child_names(&["Master Bin", "Videos"]),
        vec!["a.mp4"]
    );
}

// ============ Phase 1: import ============

#[test]
fn files_sharing_a_clip_name_build_only_the_first() {
    let ws = Workspace::new();
    for dir in ["x", "y"] {
        std::fs::create_dir_all(ws.video(dir)).unwrap();
    }
    ws.add_videos(&["x/a.mp4", "y/a.mp4"]);
    ws.add_slides(&["s1.jpg", "s2.jpg"]);
    ws.write_manifest(&json!({
        "sections": [
            {"section": "Intro", "sequences": [
                entry("x/a.mp4", "s1.jpg", "s2.jpg", "Intro_01"),
                entry("y/a.mp4", "s1.jpg", "s2.jpg", "Intro_02")
            ]}
        ]
    }));
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    let statuses: Vec<&str> = report.outcomes.iter().map(|o| o.status.label()).collect();
    assert_eq!(statuses, vec!["built", "skipped"]);
    assert_eq!(
        report.video_import.imported,
        BTreeSet::from([ws.video("x/a.mp4")])
    );
    assert_eq!(host.child_names(&["Master Bin", "Videos"]), vec!["a.mp4"]);
    assert_eq!(host.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);

    assert_eq!(logger.count(LogLevel::Warning), 1);
    let warning = ws.log_lines("[WARNING]");
    assert!(warning[0].contains("y/a.mp4"));
}

#[test]
fn import_partitions_requested_files_with_two_batches() {
    let ws = Workspace::new();
    ws.add_videos(&["a.mp4"]);
    ws.add_slides(&["s1.jpg", "s2.jpg"]);
    ws.write_manifest(&json!({
        "sections": [
            {"section": "Intro", "sequences": [
                entry("a.mp4", "s1.jpg", "s2.jpg", "Intro_01"),
                entry("a.mp4", "s2.jpg", "s1.jpg", "Intro_02"),
                entry("gone.mp4", "s1.jpg", "s2.jpg", "Intro_03")
            ]}
        ]
    }));
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(host.count("import_files"), 2);
    assert_eq!(
        report.video_import.imported,
        BTreeSet::from([ws.video("a.mp4")])
    );
    assert_eq!(
        report.video_import.missing,
        BTreeSet::from([ws.video("gone.mp4")])
    );
    assert!(report.video_import.failed.is_empty());
    assert_eq!(report.slide_import.total(), 2);
    assert!(report.slide_import.is_complete());

    assert_eq!(report.count("built"), 2);
    assert_eq!(report.count("skipped"), 1);
    assert_eq!(logger.count(LogLevel::Warning), 1);
    assert_eq!(ws.log_lines("gone.mp4").len(), 2);
}

#[test]
fn nothing_on_disk_means_no_import_calls() {
    let ws = Workspace::new();
    ws.write_manifest(&intro_manifest());
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(host.count("import_files"), 0);
    assert_eq!(report.video_import.missing.len(), 1);
    assert_eq!(report.slide_import.missing.len(), 2);
    assert_eq!(report.count("skipped"), 1);
    assert_eq!(logger.count(LogLevel::Warning), 3);
    assert_eq!(logger.count(LogLevel::Error), 0);
}

// ============ Phase 2: partial failure ============

#[test]
fn missing_video_in_one_section_leaves_the_others_intact() {
    let ws = Workspace::new();
    ws.add_videos(&["a.mp4", "c.mp4"]);
    ws.add_slides(&["s1.jpg", "s2.jpg"]);
    ws.write_manifest(&json!({
        "sections": [
            {"section": "Intro", "sequences": [entry("a.mp4", "s1.jpg", "s2.jpg", "Intro_01")]},
            {"section": "Body", "sequences": [entry("b.mp4", "s1.jpg", "s2.jpg", "Body_01")]},
            {"section": "Outro", "sequences": [entry("c.mp4", "s1.jpg", "s2.jpg", "Outro_01")]}
        ]
    }));
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    let statuses: Vec<&str> = report.outcomes.iter().map(|o| o.status.label()).collect();
    assert_eq!(statuses, vec!["built", "skipped", "built"]);

    assert_eq!(logger.count(LogLevel::Warning), 1);
    assert_eq!(logger.count(LogLevel::Error), 0);
    let warning = ws.log_lines("[WARNING]");
    assert_eq!(warning.len(), 1);
    assert!(warning[0].contains("b.mp4"));

    assert_eq!(host.child_names(&["Master Bin", "Sequences", "Body"]).len(), 0);
    assert_eq!(
        host.child_names(&["Master Bin", "Sequences", "Outro"]),
        vec!["Outro_01"]
    );
    assert!(ws
        .log_text()
        .contains("=== Project Automation Completed ==="));
}

#[test]
fn missing_end_slide_builds_a_partial_sequence() {
    let ws = Workspace::new();
    ws.add_videos(&["a.mp4"]);
    ws.add_slides(&["s1.jpg"]);
    ws.write_manifest(&intro_manifest());
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(
        report.outcomes[0].status,
        SequenceStatus::Partial {
            clips: 2,
            duration: Ticks::from_secs(35),
            missing_slides: vec!["s2.jpg".to_string()],
        }
    );
    // Reported once by the import; the assembly mentions it at INFO.
    assert_eq!(logger.count(LogLevel::Warning), 1);
    assert_eq!(ws.log_lines("s2.jpg").len(), 3);
}

#[test]
fn duplicate_sequence_names_build_once() {
    let ws = Workspace::new();
    ws.add_videos(&["a.mp4", "b.mp4"]);
    ws.add_slides(&["s1.jpg", "s2.jpg"]);
    ws.write_manifest(&json!({
        "sections": [
            {"section": "Intro", "sequences": [entry("a.mp4", "s1.jpg", "s2.jpg", "Shared")]},
            {"section": "Body", "sequences": [entry("b.mp4", "s1.jpg", "s2.jpg", "Shared")]}
        ]
    }));
    let mut host = RecordingHost::new();

    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(report.section("Intro")[0].status.label(), "built");
    assert_eq!(
        report.section("Body")[0].status,
        SequenceStatus::Skipped("duplicate sequence name".to_string())
    );
    assert_eq!(logger.count(LogLevel::Warning), 1);
    assert_eq!(host.count("create_sequence_from_clips"), 1);
}

// ============ Re-runs ============

#[test]
fn rerun_reuses_bins_and_skips_existing_sequences() {
    let ws = intro_workspace();
    let mut first = RecordingHost::new();
    ws.run(&mut first).0.unwrap();

    let mut second = RecordingHost::new();
    let (result, logger) = ws.run(&mut second);
    let report = result.unwrap();

    assert_eq!(report.project, Some(ProjectAction::Opened));
    assert_eq!(second.count("create_bin"), 0);
    assert_eq!(second.child_names(&[]), vec!["Master Bin"]);
    assert_eq!(
        second.child_names(&["Master Bin"]),
        vec!["Videos", "Slides", "Sequences"]
    );
    assert_eq!(second.child_names(&["Master Bin", "Sequences"]), vec!["Intro"]);
    assert_eq!(second.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
    assert_eq!(second.child_names(&["Master Bin", "Videos"]), vec!["a.mp4"]);
    assert_eq!(
        report.video_import.imported,
        BTreeSet::from([ws.video("a.mp4")])
    );

    assert_eq!(
        report.outcomes[0].status,
        SequenceStatus::Skipped("already exists".to_string())
    );
    assert_eq!(logger.count(LogLevel::Warning), 0);
    assert_eq!(logger.count(LogLevel::Error), 0);

    // One banner for the file across both runs.
    assert_eq!(ws.log_text().matches(LOG_BANNER).count(), 1);
}

#[test]
fn replace_policy_rebuilds_existing_sequence() {
    let mut ws = intro_workspace();
    ws.run(&mut RecordingHost::new()).0.unwrap();

    ws.settings.sequences.on_existing = OnExistingSequence::Replace;
    let mut host = RecordingHost::new();
    let report = ws.run(&mut host).0.unwrap();

    assert_eq!(host.count("remove_item"), 1);
    assert_eq!(report.count("built"), 1);
    assert_eq!(host.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
}

#[test]
fn replace_policy_keeps_existing_sequence_when_its_video_is_gone() {
    let mut ws = intro_workspace();
    ws.run(&mut RecordingHost::new()).0.unwrap();

    std::fs::remove_file(ws.video("a.mp4")).unwrap();
    ws.settings.sequences.on_existing = OnExistingSequence::Replace;
    let mut host = RecordingHost::new();
    let (result, logger) = ws.run(&mut host);
    let report = result.unwrap();

    assert_eq!(host.count("remove_item"), 0);
    assert_eq!(
        report.outcomes[0].status,
        SequenceStatus::Skipped("video 'a.mp4' not imported".to_string())
    );
    assert_eq!(host.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
    assert_eq!(logger.count(LogLevel::Warning), 1);

    let mut reopened = RecordingHost::new();
    reopened
        .open_document(&ws.settings.project_file())
        .unwrap();
    assert_eq!(reopened.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
}

#[test]
fn overwrite_policy_starts_from_an_empty_project() {
    let mut ws = intro_workspace();
    ws.run(&mut RecordingHost::new()).0.unwrap();

    ws.settings.project.on_existing = OnExistingProject::Overwrite;
    let mut host = RecordingHost::new();
    let report = ws.run(&mut host).0.unwrap();

    assert_eq!(report.project, Some(ProjectAction::Overwritten));
    assert_eq!(host.count("open_document"), 0);
    assert_eq!(report.count("built"), 1);
    assert_eq!(host.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
}

#[test]
fn open_document_is_closed_and_reopened() {
    let ws = intro_workspace();
    let mut host = RecordingHost::new();
    ws.run(&mut host).0.unwrap();

    let report = ws.run(&mut host).0.unwrap();

    assert_eq!(host.count("close_document"), 1);
    assert_eq!(report.project, Some(ProjectAction::Opened));
    assert_eq!(host.child_names(&SEQUENCE_BIN), vec!["Intro_01"]);
}
