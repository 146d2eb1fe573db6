use super::*;

#[test]
fn transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over_onto_straight(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn opaque_src_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over_onto_straight(dst, src), src);
}

#[test]
fn half_white_over_opaque_black_is_mid_grey() {
    let out = over_onto_straight([0, 0, 0, 255], [128, 128, 128, 128]);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn black_shadow_darkens_opaque_dst() {
    let out = over_onto_straight([200, 200, 200, 255], [0, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert!(out[0] < 200);
}

#[test]
fn over_transparent_dst_returns_unpremultiplied_src() {
    let out = over_onto_straight([0, 0, 0, 0], [100, 100, 100, 200]);
    assert_eq!(out[3], 200);
    assert_eq!(out[0], ((100u32 * 255 + 100) / 200) as u8);
}

#[test]
fn tile_composite_touches_only_the_tile() {
    let mut frame = RgbaFrame::solid(4, 4, [10, 10, 10, 255]);
    let rect = PixelRect {
        x0: 2,
        y0: 2,
        x1: 4,
        y1: 4,
    };
    let layer = [255u8, 255, 255, 255].repeat(4);
    over_tile_in_place(&mut frame, rect, &layer).unwrap();

    assert_eq!(frame.pixel(0, 0), [10, 10, 10, 255]);
    assert_eq!(frame.pixel(1, 3), [10, 10, 10, 255]);
    assert_eq!(frame.pixel(2, 2), [255, 255, 255, 255]);
    assert_eq!(frame.pixel(3, 3), [255, 255, 255, 255]);
}

#[test]
fn tile_composite_rejects_bad_layer_or_bounds() {
    let mut frame = RgbaFrame::solid(2, 2, [0, 0, 0, 255]);
    let rect = PixelRect {
        x0: 0,
        y0: 0,
        x1: 2,
        y1: 2,
    };
    assert!(over_tile_in_place(&mut frame, rect, &[0u8; 12]).is_err());
    let outside = PixelRect {
        x0: 1,
        y0: 1,
        x1: 3,
        y1: 3,
    };
    assert!(over_tile_in_place(&mut frame, outside, &[0u8; 16]).is_err());
}
