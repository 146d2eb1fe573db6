use crate::foundation::core::{PixelRect, RgbaFrame, mul_div255};
use crate::foundation::error::{SocialGenError, SocialGenResult};

pub(crate) type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over of a premultiplied pixel onto a straight-alpha pixel.
///
/// Returns straight alpha. A fully transparent `src` leaves `dst` bit-identical.
pub(crate) fn over_onto_straight(dst: [u8; 4], src: PremulRgba8) -> [u8; 4] {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);
    let da = u16::from(dst[3]);

    let out_a = add_sat_u8(sa, mul_div255(da, inv));
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = out_a;
    for i in 0..3 {
        let dc = mul_div255(u16::from(dst[i]), da);
        let c = add_sat_u8(src[i], mul_div255(u16::from(dc), inv));
        out[i] = unpremul(c, out_a);
    }
    out
}

/// Composite a premultiplied layer covering `rect` onto `dst` in place.
pub(crate) fn over_tile_in_place(
    dst: &mut RgbaFrame,
    rect: PixelRect,
    layer: &[u8],
) -> SocialGenResult<()> {
    let tw = rect.width() as usize;
    let th = rect.height() as usize;
    if layer.len() != tw * th * 4 {
        return Err(SocialGenError::render(
            "over_tile_in_place expects a layer matching the tile size",
        ));
    }
    if rect.x1 > dst.width || rect.y1 > dst.height {
        return Err(SocialGenError::render("tile exceeds destination bounds"));
    }

    let stride = dst.width as usize * 4;
    for ty in 0..th {
        let row = (rect.y0 as usize + ty) * stride + rect.x0 as usize * 4;
        let dst_row = &mut dst.data[row..row + tw * 4];
        let src_row = &layer[ty * tw * 4..(ty + 1) * tw * 4];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            if s[3] == 0 {
                continue;
            }
            let out = over_onto_straight([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

fn unpremul(c: u8, a: u8) -> u8 {
    if a == 255 {
        return c;
    }
    let a = u32::from(a);
    ((u32::from(c) * 255 + a / 2) / a).min(255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
