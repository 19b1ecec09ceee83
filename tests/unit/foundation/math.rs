use super::*;

#[test]
fn unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![10u8, 20, 30, 255, 40, 50, 60, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_half_alpha_restores_channel() {
    let mut px = vec![64u8, 0, 128, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 0, 255, 128]);
}
