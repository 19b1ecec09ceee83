use super::*;
use crate::assets::fonts::FontSet;

fn project(durations: &[f64], fps: u32) -> Project {
    let mut p = Project::new(32, 24, fps);
    for (i, d) in durations.iter().enumerate() {
        p.slides
            .push(Slide::new(format!("s{i}"), "").with_duration(*d));
    }
    p
}

#[test]
fn frame_count_rounds_and_never_drops_below_one() {
    assert_eq!(frame_count(2.0, 30), 60);
    assert_eq!(frame_count(1.5, 30), 45);
    assert_eq!(frame_count(1.0, 24), 24);
    assert_eq!(frame_count(0.0, 30), 1);
    assert_eq!(frame_count(0.01, 30), 1);
    assert_eq!(frame_count(0.05, 30), 2);
    assert_eq!(frame_count(f64::NAN, 30), 1);
}

#[test]
fn file_names_sort_in_temporal_order() {
    assert_eq!(frame_file_name(FrameIndex(0)), "frame_00000.png");
    assert_eq!(frame_file_name(FrameIndex(104)), "frame_00104.png");
    let mut names: Vec<String> = [9u64, 100, 10, 0, 99_999]
        .iter()
        .map(|i| frame_file_name(FrameIndex(*i)))
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "frame_00000.png",
            "frame_00009.png",
            "frame_00010.png",
            "frame_00100.png",
            "frame_99999.png"
        ]
    );
}

#[test]
fn slides_own_contiguous_global_ranges() {
    let p = project(&[2.0, 1.5], 30);
    let seq = FrameSequence::new(&p).unwrap();
    assert_eq!(seq.total_frames(), 105);
    assert_eq!(
        seq.slide_ranges(),
        &[
            FrameRange::new(FrameIndex(0), FrameIndex(60)).unwrap(),
            FrameRange::new(FrameIndex(60), FrameIndex(105)).unwrap(),
        ]
    );

    let slots: Vec<FrameSlot> = seq.iter().collect();
    assert_eq!(slots.len(), 105);
    for (i, slot) in slots.iter().enumerate() {
        assert_eq!(slot.index, FrameIndex(i as u64));
        let expected_slide = if i < 60 { 0 } else { 1 };
        assert_eq!(slot.slide_index, expected_slide);
    }
    assert_eq!(slots[60].local_index, 0);
    assert_eq!(slots[104].local_index, 44);
}

#[test]
fn iteration_is_restartable() {
    let p = project(&[1.0, 1.0], 5);
    let seq = FrameSequence::new(&p).unwrap();
    let first: Vec<_> = seq.iter().collect();
    let second: Vec<_> = seq.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn slot_lookup_matches_iteration() {
    let p = project(&[0.2, 0.0, 1.0], 10);
    let seq = FrameSequence::new(&p).unwrap();
    for slot in seq.iter() {
        assert_eq!(seq.slot(slot.index), Some(slot));
    }
    assert_eq!(seq.slot(FrameIndex(seq.total_frames())), None);
    assert_eq!(seq.slot(FrameIndex(2)).unwrap().slide_index, 1);
}

#[test]
fn empty_project_yields_empty_sequence() {
    let p = project(&[], 30);
    let seq = FrameSequence::new(&p).unwrap();
    assert!(seq.is_empty());
    assert_eq!(seq.iter().count(), 0);
}

#[test]
fn bad_geometry_is_invalid_project() {
    for p in [Project::new(0, 24, 30), Project::new(32, 0, 30), Project::new(32, 24, 0)] {
        assert!(matches!(
            FrameSequence::new(&p),
            Err(SlidecastError::InvalidProject(_))
        ));
    }
}

#[test]
fn frames_of_one_slide_are_identical() {
    let p = project(&[0.1], 30);
    let seq = FrameSequence::new(&p).unwrap();
    let mut r = SlideRasterizer::new(p.canvas(), &FontSet::new()).unwrap();
    let frames: Vec<Frame> = seq
        .iter()
        .map(|slot| seq.rasterize(&slot, &mut r).unwrap())
        .collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].file_name(), "frame_00002.png");
    assert!(frames.windows(2).all(|w| w[0].image_bytes == w[1].image_bytes));
}

#[test]
fn oversized_projects_are_rejected_instead_of_overflowing() {
    let p = project(&[1e19, 1e19], 30);
    assert!(matches!(
        FrameSequence::new(&p),
        Err(SlidecastError::InvalidProject(_))
    ));

    let p = project(&[9_999.9], 10);
    let seq = FrameSequence::new(&p).unwrap();
    assert_eq!(seq.total_frames(), 99_999);
    let last = seq.slot(FrameIndex(99_998)).unwrap();
    assert_eq!(frame_file_name(last.index), "frame_99998.png");
}
