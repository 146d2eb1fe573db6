use std::io::Cursor;

use super::*;

#[test]
fn decode_png_keeps_straight_alpha() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba.clone()).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let frame = decode_image(&buf).unwrap();
    assert_eq!(frame.width, 1);
    assert_eq!(frame.height, 1);
    assert_eq!(frame.data, src_rgba);
}

#[test]
fn decode_rgb_jpeg_is_opaque() {
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([20, 40, 60]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();

    let frame = decode_image(&buf).unwrap();
    assert_eq!((frame.width, frame.height), (8, 4));
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn decode_garbage_is_image_load_error() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, SocialGenError::ImageLoad(_)));
}

#[test]
fn premultiply_scales_color_by_alpha() {
    let mut px = vec![100u8, 50, 200, 128, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128,
            0,
            0,
            0,
            0
        ]
    );
}
