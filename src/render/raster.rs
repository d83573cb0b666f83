use image::RgbaImage;

use crate::{
    curve::CurveParams,
    foundation::core::{AnimationParams, BACKGROUND, FOREGROUND},
};

/// Map a normalized coordinate in `[-1, 1]` to a pixel column/row.
///
/// Rounds by adding one half and truncating toward zero, then clamps to the canvas.
pub fn to_pixel(v: f64, size: u32) -> u32 {
    let size_f = f64::from(size);
    let offset = (v * size_f + 0.5) as i64;
    (i64::from(size) + offset).clamp(0, i64::from(size) * 2) as u32
}

/// Blank canvas of side `2 * size + 1` filled with the background colour.
pub fn blank_frame(params: &AnimationParams) -> RgbaImage {
    let side = params.canvas_side();
    RgbaImage::from_pixel(side, side, BACKGROUND)
}

/// Rasterize one frame of the curve in full colour.
pub fn render_frame(params: &AnimationParams, curve: &CurveParams) -> RgbaImage {
    let mut img = blank_frame(params);
    trace(&mut img, params.size, curve);
    img
}

/// Set every pixel hit by the curve to the foreground colour.
pub fn trace(img: &mut RgbaImage, size: u32, curve: &CurveParams) {
    for (x, y) in curve.points() {
        img.put_pixel(to_pixel(x, size), to_pixel(y, size), FOREGROUND);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_mapping_centres_the_unit_square() {
        assert_eq!(to_pixel(0.0, 100), 100);
        assert_eq!(to_pixel(1.0, 100), 200);
        assert_eq!(to_pixel(0.004, 100), 100);
        assert_eq!(to_pixel(0.006, 100), 101);
        // Truncation goes toward zero, so negatives land one pixel closer to the centre.
        assert_eq!(to_pixel(-0.014, 100), 100);
        assert_eq!(to_pixel(-1.0, 100), 1);
    }

    #[test]
    fn frame_has_expected_dimensions_and_colours() {
        let params = AnimationParams::default();
        let img = render_frame(&params, &CurveParams::new(&params, 1.5, 0.0));
        assert_eq!(img.dimensions(), (201, 201));

        let mut fg = 0usize;
        for p in img.pixels() {
            assert!(*p == BACKGROUND || *p == FOREGROUND);
            if *p == FOREGROUND {
                fg += 1;
            }
        }
        assert!(fg > 0);
        // t = 0 maps to (size, size + round(sin(phase) * size)).
        assert_eq!(*img.get_pixel(100, 100), FOREGROUND);
    }

    #[test]
    fn rendering_is_deterministic() {
        let params = AnimationParams::default();
        let curve = CurveParams::new(&params, 2.25, 1.4);
        let a = render_frame(&params, &curve);
        let b = render_frame(&params, &curve);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn tracing_twice_is_idempotent() {
        let params = AnimationParams::default();
        let curve = CurveParams::new(&params, 0.8, 0.2);
        let mut img = render_frame(&params, &curve);
        let once = img.clone();
        trace(&mut img, params.size, &curve);
        assert_eq!(img.as_raw(), once.as_raw());
    }
}
