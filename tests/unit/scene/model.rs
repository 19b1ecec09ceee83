use super::*;

fn two_slides() -> Project {
    Project::new(720, 1280, 30)
        .with_slide(Slide::new("a", "Welcome to Video Generator"))
        .with_slide(Slide::new("b", "Type text, pick colors, export WebM").with_duration(1.5))
}

#[test]
fn json_defaults_and_generated_ids() {
    let p = Project::from_json_str(
        r##"{
            "slides": [
                { "text": "Hello", "duration_sec": 1, "bg": "#000000", "text_color": "#ffffff" },
                { "id": "keep", "text": "World" }
            ]
        }"##,
    )
    .unwrap();

    assert_eq!((p.width, p.height, p.fps), (720, 1280, 30));
    assert_eq!(p.slides[0].id.as_str(), "slide-1");
    assert_eq!(p.slides[0].bg, Rgb8::BLACK);
    assert_eq!(p.slides[1].id.as_str(), "keep");
    assert_eq!(p.slides[1].duration_sec, 2.0);
    assert_eq!(p.slides[1].bg, Rgb8::new(0x1f, 0x29, 0x37));
    assert_eq!(p.slides[1].text_color, Rgb8::WHITE);
}

#[test]
fn json_round_trips_through_pretty_output() {
    let p = two_slides();
    let back = Project::from_json_str(&p.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, p);
}

#[test]
fn bad_json_is_a_serde_error() {
    let err = Project::from_json_str("{ \"slides\": 3 }").unwrap_err();
    assert!(matches!(err, SlidecastError::Serde(_)));
    let err = Project::from_json_str(r##"{ "slides": [ { "bg": "#zzzzzz" } ] }"##).unwrap_err();
    assert!(matches!(err, SlidecastError::Serde(_)));
}

#[test]
fn validation_rejects_bad_geometry_and_timing() {
    assert!(two_slides().validate().is_ok());
    assert!(matches!(
        Project::new(0, 10, 30).validate(),
        Err(SlidecastError::InvalidProject(_))
    ));
    assert!(Project::new(10, 0, 30).validate().is_err());
    assert!(Project::new(10, 10, 0).validate().is_err());
    assert!(Project::new(70_000, 10, 30).validate().is_err());

    let neg = Project::new(10, 10, 30).with_slide(Slide::new("x", "x").with_duration(-1.0));
    assert!(neg.validate().is_err());
    let nan = Project::new(10, 10, 30).with_slide(Slide::new("x", "x").with_duration(f64::NAN));
    assert!(nan.validate().is_err());
}

#[test]
fn empty_slide_list_is_valid_but_not_renderable() {
    let p = Project::new(720, 1280, 30);
    assert!(p.validate().is_ok());
    assert!(matches!(
        p.validate_for_render(),
        Err(SlidecastError::InvalidProject(_))
    ));
}

#[test]
fn duration_sums_frame_counts() {
    let p = two_slides();
    assert_eq!(p.duration_frames(), 60 + 45);
    assert!((p.duration_secs() - 3.5).abs() < 1e-9);
}

#[test]
fn frame_total_is_capped_without_overflow() {
    let huge = Project::new(16, 16, 30)
        .with_slide(Slide::new("a", "").with_duration(1e19))
        .with_slide(Slide::new("b", "").with_duration(1e19));
    assert_eq!(huge.duration_frames(), u64::MAX);
    assert!(matches!(
        huge.validate(),
        Err(SlidecastError::InvalidProject(_))
    ));

    let at_limit = Project::new(16, 16, 10).with_slide(Slide::new("a", "").with_duration(10_000.0));
    assert_eq!(at_limit.duration_frames(), 100_000);
    assert!(at_limit.validate().is_ok());

    let over = at_limit.with_slide(Slide::new("b", "").with_duration(0.0));
    assert!(over.validate().is_err());
}
