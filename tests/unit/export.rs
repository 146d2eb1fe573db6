use std::time::{Duration, UNIX_EPOCH};

use super::*;
use crate::assets::loader::DefaultImageLoader;
use crate::foundation::core::RgbaFrame;

fn png_ref(frame: &RgbaFrame) -> ImageRef {
    encode_frame(frame, ExportFormat::Png).unwrap().to_image_ref()
}

#[test]
fn filename_uses_millis_and_extension() {
    let t = UNIX_EPOCH + Duration::from_millis(1_712_345_678_901);
    assert_eq!(
        download_filename(ExportFormat::Png, t),
        "social-post-1712345678901.png"
    );
    assert_eq!(
        download_filename(ExportFormat::Jpg, t),
        "social-post-1712345678901.jpg"
    );
}

#[tokio::test]
async fn png_export_is_lossless() {
    let frame = RgbaFrame::solid(7, 5, [10, 200, 30, 128]);
    let out = export_image(&DefaultImageLoader::default(), &png_ref(&frame), ExportFormat::Png)
        .await
        .unwrap();
    assert_eq!((out.width, out.height), (7, 5));
    let back = decode_image(&out.bytes).unwrap();
    assert_eq!(back, frame);
}

#[tokio::test]
async fn jpg_export_drops_alpha() {
    let frame = RgbaFrame::solid(16, 16, [255, 255, 255, 0]);
    let out = export_image(&DefaultImageLoader::default(), &png_ref(&frame), ExportFormat::Jpg)
        .await
        .unwrap();
    assert_eq!(out.format, ExportFormat::Jpg);
    let back = decode_image(&out.bytes).unwrap();
    let px = back.pixel(8, 8);
    assert_eq!(px[3], 255);
    assert!(px[0] < 8 && px[1] < 8 && px[2] < 8, "flattened onto black: {px:?}");
}

#[tokio::test]
async fn save_writes_named_file() {
    let dir = std::env::temp_dir().join(format!("socialgen-export-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let t = UNIX_EPOCH + Duration::from_millis(42);
    let frame = RgbaFrame::solid(3, 3, [1, 2, 3, 255]);
    let path = save_image(
        &DefaultImageLoader::default(),
        &png_ref(&frame),
        ExportFormat::Png,
        &dir,
        t,
    )
    .await
    .unwrap();
    assert_eq!(path.file_name().unwrap(), "social-post-42.png");
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(decode_image(&bytes).unwrap(), frame);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn memory_clipboard_keeps_last_text() {
    let clip = MemoryClipboard::default();
    assert_eq!(clip.contents(), None);
    clip.write_text("first").unwrap();
    clip.write_text("second #tag").unwrap();
    assert_eq!(clip.contents().as_deref(), Some("second #tag"));
}

#[tokio::test]
async fn saves_in_the_same_millisecond_do_not_overwrite() {
    let dir = std::env::temp_dir().join(format!("socialgen-export-batch-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let t = UNIX_EPOCH + Duration::from_millis(7);
    let loader = DefaultImageLoader::default();

    let mut paths = Vec::new();
    for shade in [10u8, 20, 30] {
        let frame = RgbaFrame::solid(2, 2, [shade, shade, shade, 255]);
        let path = save_image(&loader, &png_ref(&frame), ExportFormat::Png, &dir, t)
            .await
            .unwrap();
        paths.push(path);
    }

    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["social-post-7.png", "social-post-7-1.png", "social-post-7-2.png"]
    );
    for (path, shade) in paths.iter().zip([10u8, 20, 30]) {
        let back = decode_image(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(back.pixel(0, 0), [shade, shade, shade, 255]);
    }
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 3);
    let _ = std::fs::remove_dir_all(&dir);
}
