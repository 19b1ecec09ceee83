use super::*;

#[test]
fn font_stack_quotes_families_and_ends_generic() {
    assert_eq!(css_font_stack(&[]), "sans-serif");
    assert_eq!(
        css_font_stack(&["DejaVu Sans".to_string(), "Odd\"Name".to_string()]),
        "\"DejaVu Sans\", \"Odd\\\"Name\", sans-serif"
    );
}

#[test]
fn missing_font_file_is_a_raster_error() {
    let err = FontSet::from_paths(&["definitely/not/here.ttf"]).unwrap_err();
    assert!(matches!(err, SlidecastError::Raster(_)));
}

#[test]
fn empty_set_shaper_falls_back_to_fixed_advance() {
    let mut shaper = TextShaper::new(&FontSet::new()).unwrap();
    assert!(!shaper.has_fonts());
    let expected = FixedAdvanceMeasure::default().measure("Hello", 40);
    assert_eq!(shaper.measure("Hello", 40), expected);
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut set = FontSet::new();
    set.push_bytes("garbage", vec![0u8; 64]);
    assert_eq!(set.len(), 1);
    assert!(matches!(
        TextShaper::new(&set),
        Err(SlidecastError::Raster(_))
    ));
}

#[test]
fn system_fonts_measure_monotonically() {
    let set = FontSet::discover_system();
    if set.is_empty() {
        eprintln!("skipping: no system font found");
        return;
    }
    let mut shaper = TextShaper::new(&set).unwrap();
    assert!(shaper.has_fonts());
    assert!(shaper.font_stack().ends_with("sans-serif"));

    let small = shaper.measure("Hello world", 20);
    let large = shaper.measure("Hello world", 40);
    assert!(small > 0.0);
    assert!(large > small);
    assert_eq!(shaper.measure("Hello world", 40), large);
    assert!(shaper.measure("Hello world again", 40) > large);
}
