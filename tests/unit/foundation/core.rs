use super::*;

#[test]
fn frame_range_validation_and_len() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(60), FrameIndex(105)).unwrap();
    assert_eq!(r.len_frames(), 45);
    assert!(r.contains(FrameIndex(60)));
    assert!(r.contains(FrameIndex(104)));
    assert!(!r.contains(FrameIndex(105)));
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap().is_empty());
}

#[test]
fn hex_colors_parse_in_all_supported_forms() {
    assert_eq!(Rgb8::from_hex("#0ea5e9").unwrap(), Rgb8::new(0x0e, 0xa5, 0xe9));
    assert_eq!(Rgb8::from_hex("F97316").unwrap(), Rgb8::new(0xf9, 0x73, 0x16));
    assert_eq!(Rgb8::from_hex("#fff").unwrap(), Rgb8::WHITE);
    assert_eq!(" #000000 ".parse::<Rgb8>().unwrap(), Rgb8::BLACK);
}

#[test]
fn hex_colors_reject_garbage() {
    assert!(Rgb8::from_hex("#12345").is_err());
    assert!(Rgb8::from_hex("#gg0000").is_err());
    assert!(Rgb8::from_hex("").is_err());
    assert!(Rgb8::from_hex("#ééé").is_err());
}

#[test]
fn rgb8_serializes_as_lowercase_hex() {
    let json = serde_json::to_string(&Rgb8::new(0x11, 0x18, 0x27)).unwrap();
    assert_eq!(json, "\"#111827\"");
    let back: Rgb8 = serde_json::from_str("\"#1F2937\"").unwrap();
    assert_eq!(back, Rgb8::new(0x1f, 0x29, 0x37));
    assert!(serde_json::from_str::<Rgb8>("\"nope\"").is_err());
}
