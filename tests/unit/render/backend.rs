use super::*;

fn solid(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
    }
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = solid(3, 2, [1, 2, 3, 255]);
    assert_eq!(f.pixel(2, 1), Some([1, 2, 3, 255]));
    assert_eq!(f.pixel(3, 0), None);
    assert_eq!(f.pixel(0, 2), None);
}

#[test]
fn png_output_decodes_to_the_same_pixels() {
    let f = solid(4, 3, [14, 165, 233, 255]);
    let png = f.to_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 3));
    assert_eq!(decoded.as_raw(), &f.data);
}

#[test]
fn png_rejects_short_buffers() {
    let mut f = solid(2, 2, [0, 0, 0, 255]);
    f.data.pop();
    assert!(matches!(f.to_png(), Err(SlidecastError::Raster(_))));
}
