use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn sequence_pattern_parsing() {
    assert_eq!(
        parse_sequence_pattern("frame_%05d.png").unwrap(),
        ("frame_", 5, ".png")
    );
    assert_eq!(parse_sequence_pattern("%d").unwrap(), ("", 0, ""));
    assert!(parse_sequence_pattern("frame.png").is_err());
    assert!(parse_sequence_pattern("frame_%xd.png").is_err());
}

#[test]
fn io_requires_load() {
    let mut e = InMemoryEngine::new();
    assert!(!e.is_loaded());
    assert!(e.write_file("a.png", b"x").is_err());
    e.load().unwrap();
    assert!(e.is_loaded());
    e.write_file("a.png", b"x").unwrap();
    assert_eq!(e.read_file("a.png").unwrap(), b"x");
    e.remove_file("a.png").unwrap();
    assert!(e.remove_file("a.png").is_err());
    assert!(e.write_file("../escape.png", b"x").is_err());
}

#[test]
fn run_counts_contiguous_frames_and_writes_output() {
    let mut e = InMemoryEngine::new();
    e.load().unwrap();
    for i in 0..3 {
        e.write_file(&format!("frame_{i:05}.png"), b"png").unwrap();
    }
    // A gap ends the sequence.
    e.write_file("frame_00004.png", b"png").unwrap();

    e.run(&args(&[
        "-framerate",
        "30",
        "-i",
        "frame_%05d.png",
        "-c:v",
        "libvpx",
        "out.webm",
    ]))
    .unwrap();
    let out = e.read_file("out.webm").unwrap();
    let probe = InMemoryEngine::probe_output(&out).unwrap();
    assert_eq!(probe, SyntheticVideo { frames: 3, fps: 30 });
    assert!((probe.duration_secs() - 0.1).abs() < 1e-9);
    assert_eq!(e.runs().len(), 1);
}

#[test]
fn run_without_inputs_fails_like_ffmpeg() {
    let mut e = InMemoryEngine::new();
    e.load().unwrap();
    let err = e
        .run(&args(&["-framerate", "30", "-i", "frame_%05d.png", "out.webm"]))
        .unwrap_err();
    assert!(err.to_string().contains("frame_%05d.png"));
    assert!(e.file("out.webm").is_none());
}

#[test]
fn injected_failures() {
    let mut e = InMemoryEngine::new().failing_load("network down");
    assert!(matches!(e.load(), Err(SlidecastError::EngineInit(_))));
    assert_eq!(e.load_calls(), 1);

    let mut e = InMemoryEngine::new().failing_write_at(1);
    e.load().unwrap();
    e.write_file("a.png", b"1").unwrap();
    assert!(e.write_file("b.png", b"2").is_err());
    assert_eq!(e.staged_names(), vec!["a.png".to_string()]);

    let mut e = InMemoryEngine::new().failing_run("codec exploded");
    e.load().unwrap();
    let err = e.run(&args(&["-i", "x%d", "o"])).unwrap_err();
    assert!(err.to_string().contains("codec exploded"));
}

#[test]
fn probe_rejects_foreign_bytes() {
    assert!(InMemoryEngine::probe_output(b"\x1aE\xdf\xa3webm").is_none());
    assert!(InMemoryEngine::probe_output(b"SLIDECAST-MEM frames=2").is_none());
}
