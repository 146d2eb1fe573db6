use super::*;

fn overlay(text: &str, opacity: f32, visible: bool) -> WatermarkSettings {
    WatermarkSettings::new(text, opacity, visible).unwrap()
}

fn grey(w: u32, h: u32) -> RgbaFrame {
    RgbaFrame::solid(w, h, [90, 120, 150, 255])
}

#[test]
fn font_size_has_floor_and_scales_with_width() {
    let style = WatermarkStyle::default();
    assert_eq!(style.font_size_for(100), 24);
    assert_eq!(style.font_size_for(479), 24);
    assert_eq!(style.font_size_for(1000), 50);
    assert_eq!(style.font_size_for(4096), 204);
}

#[test]
fn placement_is_inset_from_bottom_right() {
    let style = WatermarkStyle::default();
    let p = place(1000, 800, 200.0, 60.0, 50.0, &style);
    assert_eq!(p.origin, (1000.0 - 25.0 - 200.0, 800.0 - 25.0 - 60.0));
    assert_eq!(p.tile.x1, 1000);
    assert_eq!(p.tile.y1, 800);
    assert!(p.tile.x0 < 775);
    assert!(p.tile.y0 < 715);
}

#[test]
fn hidden_or_empty_overlay_returns_source() {
    let src = grey(64, 48);
    let font = WatermarkFont::bundled();
    let style = WatermarkStyle::default();
    let hidden = render_watermark(&src, &overlay("@Brand", 1.0, false), &style, &font).unwrap();
    assert_eq!(hidden, src);
    let empty = render_watermark(&src, &overlay("", 1.0, true), &style, &font).unwrap();
    assert_eq!(empty, src);
}

#[test]
fn visible_overlay_changes_only_bottom_right() {
    let src = grey(400, 300);
    let out = render_watermark(
        &src,
        &overlay("@Brand", 0.6, true),
        &WatermarkStyle::default(),
        &WatermarkFont::bundled(),
    )
    .unwrap();
    assert_eq!((out.width, out.height), (400, 300));
    assert_ne!(out, src);

    for y in 0..150 {
        for x in 0..400 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y), "top half changed at {x},{y}");
        }
    }
    let brighter = (200..400)
        .flat_map(|x| (200..300).map(move |y| (x, y)))
        .any(|(x, y)| out.pixel(x, y)[0] > src.pixel(x, y)[0]);
    assert!(brighter);
}

#[test]
fn zero_opacity_draws_nothing() {
    let src = grey(200, 200);
    let out = render_watermark(
        &src,
        &overlay("@Brand", 0.0, true),
        &WatermarkStyle::default(),
        &WatermarkFont::bundled(),
    )
    .unwrap();
    assert_eq!(out, src);
}

#[test]
fn shadow_darkens_around_glyphs() {
    let src = RgbaFrame::solid(300, 200, [240, 240, 240, 255]);
    let out = render_watermark(
        &src,
        &overlay("@Brand", 1.0, true),
        &WatermarkStyle::default(),
        &WatermarkFont::bundled(),
    )
    .unwrap();
    let darker = out.data.chunks_exact(4).any(|px| px[0] < 240);
    assert!(darker);
}

#[test]
fn rendering_is_deterministic() {
    let src = grey(320, 240);
    let style = WatermarkStyle::default();
    let font = WatermarkFont::bundled();
    let a = render_watermark(&src, &overlay("@Brand", 0.6, true), &style, &font).unwrap();
    let b = render_watermark(&src, &overlay("@Brand", 0.6, true), &style, &font).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_style_is_rejected() {
    let style = WatermarkStyle {
        width_divisor: 0,
        ..WatermarkStyle::default()
    };
    let err = render_watermark(
        &grey(50, 50),
        &overlay("@a", 0.5, true),
        &style,
        &WatermarkFont::bundled(),
    )
    .unwrap_err();
    assert!(matches!(err, SocialGenError::Validation(_)));
}

#[test]
fn tiny_image_keeps_its_size() {
    let src = grey(8, 8);
    let out = render_watermark(
        &src,
        &overlay("@VeryLongBrandName", 1.0, true),
        &WatermarkStyle::default(),
        &WatermarkFont::bundled(),
    )
    .unwrap();
    assert_eq!((out.width, out.height), (8, 8));
}

fn bright_bounds(frame: &RgbaFrame) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..frame.height {
        for x in 0..frame.width {
            if frame.pixel(x, y)[0] <= 128 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            });
        }
    }
    bounds
}

#[test]
fn text_spans_its_layout_and_sits_on_the_bottom_right_anchor() {
    let src = RgbaFrame::solid(1000, 1000, [0, 0, 0, 255]);
    let style = WatermarkStyle::default();
    let font = WatermarkFont::bundled();
    let out = render_watermark(&src, &overlay("@Brand", 1.0, true), &style, &font).unwrap();

    let font_px = style.font_size_for(1000) as f32;
    let mut engine = TextLayoutEngine::new(&font).unwrap();
    let layout = engine
        .layout_line("@Brand", font_px, TextBrushRgba8::WHITE)
        .unwrap();
    let p = place(1000, 1000, layout.width(), layout.height(), font_px, &style);
    let margin = f64::from(font_px * style.margin_ratio);

    let (x0, y0, x1, y1) = bright_bounds(&out).expect("text drawn");
    let drawn_w = f64::from(x1 - x0);
    assert!(
        drawn_w > 0.8 * f64::from(layout.width()),
        "drawn {drawn_w} vs layout {}",
        layout.width()
    );

    let right = 1000.0 - margin;
    assert!((f64::from(x1) - right).abs() <= 8.0, "right edge {x1}");
    let bottom = 1000.0 - margin;
    assert!(f64::from(y1) <= bottom + 2.0, "bottom edge {y1}");
    assert!(
        f64::from(y1) >= bottom - 0.3 * f64::from(font_px),
        "bottom edge {y1}"
    );
    assert!(f64::from(y0) >= p.origin.1 - 2.0, "top edge {y0}");
    assert!(f64::from(x0) >= p.origin.0 - 2.0, "left edge {x0}");
}
