use super::*;
use crate::assets::decode::decode_image;

fn checker(w: u32, h: u32) -> RgbaFrame {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = if (x + y) % 2 == 0 { 30 } else { 220 };
            data.extend_from_slice(&[v, 255 - v, 128, 255]);
        }
    }
    RgbaFrame::from_raw(w, h, data).unwrap()
}

#[test]
fn png_round_trip_is_lossless() {
    let frame = checker(7, 5);
    let enc = encode_frame(&frame, ExportFormat::Png).unwrap();
    assert_eq!((enc.width, enc.height), (7, 5));
    assert_eq!(&enc.bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(decode_image(&enc.bytes).unwrap(), frame);
}

#[test]
fn png_encoding_is_byte_stable() {
    let frame = checker(16, 16);
    let a = encode_frame(&frame, ExportFormat::Png).unwrap();
    let b = encode_frame(&frame, ExportFormat::Png).unwrap();
    assert_eq!(a.bytes, b.bytes);
}

#[test]
fn jpeg_flattens_transparency_onto_black() {
    let frame = RgbaFrame::solid(8, 8, [255, 255, 255, 0]);
    let enc = encode_frame(&frame, ExportFormat::Jpg).unwrap();
    assert_eq!(&enc.bytes[..2], &[0xFF, 0xD8]);
    let back = decode_image(&enc.bytes).unwrap();
    assert!(back.data.chunks_exact(4).all(|px| px[0] < 8 && px[3] == 255));
}

#[test]
fn data_url_uses_format_mime() {
    let enc = encode_frame(&checker(2, 2), ExportFormat::Png).unwrap();
    assert!(enc.to_data_url().starts_with("data:image/png;base64,"));
    let ImageRef::Data { bytes, .. } = enc.to_image_ref() else {
        panic!("expected embedded image");
    };
    assert_eq!(bytes, enc.bytes);
}
