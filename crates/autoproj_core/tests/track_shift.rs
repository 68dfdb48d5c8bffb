//! Insertion with the "before" policy shifts every later clip on every track.

mod common;

use std::fs;

use tempfile::{tempdir, TempDir};

use autoproj_core::assembler::{find_clip_by_name, InsertPosition, TimelineAssembler};
use autoproj_core::config::{BinSettings, SequenceSettings};
use autoproj_core::host::{HostProject, ItemHandle, MemoryHost};
use autoproj_core::logging::{LogConfig, RunLogger};
use autoproj_core::timeline::{ClipId, Ticks, TrackLayout};

struct Timeline {
    _dir: TempDir,
    host: MemoryHost,
    bin: ItemHandle,
    sequence: ItemHandle,
}

/// Sequence with a(30s) then b(20s) on V1/A1 and c(10s) at 0 on V2/A2.
fn timeline() -> Timeline {
    let dir = tempdir().unwrap();
    let files = ["a.mp4", "b.mp4", "c.mp4", "s1.jpg"];
    for name in files {
        fs::write(dir.path().join(name), b"media").unwrap();
    }

    let mut host = MemoryHost::new(common::probe());
    host.new_document(&dir.path().join("project.json")).unwrap();
    let root = host.root_item().unwrap();
    let bin = host.create_bin(root, "Media").unwrap();
    let paths: Vec<_> = files.iter().map(|f| dir.path().join(f)).collect();
    host.import_files(&paths, bin).unwrap();

    let clip = |host: &MemoryHost, name: &str| {
        find_clip_by_name(host, name, bin).unwrap().unwrap()
    };
    let a = clip(&host, "a.mp4");
    let b = clip(&host, "b.mp4");
    let c = clip(&host, "c.mp4");

    let sequence = host.create_sequence_from_clips("Seq", &[a, b], bin).unwrap();
    host.insert_clip(sequence, c, Ticks::ZERO, 1, 1).unwrap();

    Timeline {
        _dir: dir,
        host,
        bin,
        sequence,
    }
}

fn starts(layout: &TrackLayout) -> Vec<(ClipId, Ticks)> {
    let mut all: Vec<_> = layout
        .tracks()
        .flat_map(|t| t.clips.iter().map(|c| (c.id, c.start)))
        .collect();
    all.sort();
    all
}

#[test]
fn later_clips_move_by_the_inserted_duration_on_all_tracks() {
    let logger = RunLogger::detached(LogConfig::default(), None);
    let bins = BinSettings::default();
    let sequences = SequenceSettings::default();
    let assembler = TimelineAssembler::new(&logger, &bins, &sequences);
    let slide_duration = Ticks::from_secs(5);

    // Clip boundaries: sequence start, between a and b, sequence end.
    for at in [Ticks::ZERO, Ticks::from_secs(30), Ticks::from_secs(50)] {
        let mut tl = timeline();
        let before = tl.host.track_layout(tl.sequence).unwrap();
        let slide = find_clip_by_name(&tl.host, "s1.jpg", tl.bin)
            .unwrap()
            .unwrap();

        let placed = assembler
            .insert_item(&mut tl.host, tl.sequence, slide, at, InsertPosition::Before)
            .unwrap();
        assert_eq!(placed, at);

        let after = tl.host.track_layout(tl.sequence).unwrap();
        after.check().unwrap();

        let moved: std::collections::HashMap<_, _> = starts(&after).into_iter().collect();
        for (id, old_start) in starts(&before) {
            let expected = if old_start >= at {
                old_start + slide_duration
            } else {
                old_start
            };
            assert_eq!(moved[&id], expected, "clip {} for insertion at {}", id, at);
        }
        assert_eq!(after.clip_count(), before.clip_count() + 1);
    }
}

#[test]
fn shift_touches_audio_only_tracks_too() {
    let logger = RunLogger::detached(LogConfig::default(), None);
    let bins = BinSettings::default();
    let sequences = SequenceSettings::default();
    let assembler = TimelineAssembler::new(&logger, &bins, &sequences);
    let mut tl = timeline();

    let moved = assembler
        .shift_all_tracks(&mut tl.host, tl.sequence, Ticks::ZERO, Ticks::from_secs(7))
        .unwrap();

    // a and b on V1/A1, c on V2/A2.
    assert_eq!(moved, 6);
    let layout = tl.host.track_layout(tl.sequence).unwrap();
    assert_eq!(layout.audio[0].clips[0].start, Ticks::from_secs(7));
    assert_eq!(layout.audio[0].clips[1].start, Ticks::from_secs(37));
    assert_eq!(layout.audio[1].clips[0].start, Ticks::from_secs(7));
    layout.check().unwrap();
}

#[test]
fn after_policy_leaves_later_clips_alone() {
    let logger = RunLogger::detached(LogConfig::default(), None);
    let bins = BinSettings::default();
    let sequences = SequenceSettings::default();
    let assembler = TimelineAssembler::new(&logger, &bins, &sequences);
    let mut tl = timeline();
    let before = tl.host.track_layout(tl.sequence).unwrap();
    let slide = find_clip_by_name(&tl.host, "s1.jpg", tl.bin)
        .unwrap()
        .unwrap();

    // Insert point is the reference time plus the slide's own duration.
    let placed = assembler
        .insert_item(
            &mut tl.host,
            tl.sequence,
            slide,
            Ticks::from_secs(50),
            InsertPosition::After,
        )
        .unwrap();

    assert_eq!(placed, Ticks::from_secs(55));
    let after = tl.host.track_layout(tl.sequence).unwrap();
    assert_eq!(starts(&after).len(), starts(&before).len() + 1);
    for (id, start) in starts(&before) {
        assert!(starts(&after).contains(&(id, start)));
    }
}
