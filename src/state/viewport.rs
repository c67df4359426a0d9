//! Pure geometry for mapping document content into screen space.
//!
//! A screen position of a content point `p` is `anchor + translate + p * scale`,
//! where `anchor` is the screen position of the content origin at zero
//! translate (for a centered canvas: its top-left corner). Everything here is
//! side-effect free; rendering and DOM updates live in the components.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Viewport {
    pub fn at_scale(scale: f64) -> Self {
        Self {
            scale,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::at_scale(1.0)
    }
}

pub fn clamp_scale(scale: f64, min: f64, max: f64) -> f64 {
    scale.clamp(min, max)
}

/// Initial scale so the content fits the container width, reduced by
/// `padding_px` and scaled by `size_factor`, clamped to `[min_clamp, max_clamp]`.
pub fn fit_scale(
    content_width: f64,
    container_width: f64,
    padding_px: f64,
    size_factor: f64,
    min_clamp: f64,
    max_clamp: f64,
) -> f64 {
    if content_width <= 0.0 {
        return min_clamp;
    }
    let scale = ((container_width - padding_px) * size_factor) / content_width;
    clamp_scale(scale, min_clamp, max_clamp)
}

/// Content coordinate currently rendered under `focal` on screen.
pub fn content_point_under(viewport: &Viewport, focal: Point, anchor: Point) -> Point {
    Point {
        x: (focal.x - anchor.x - viewport.translate_x) / viewport.scale,
        y: (focal.y - anchor.y - viewport.translate_y) / viewport.scale,
    }
}

/// Translate that keeps `content` rendered under `focal` at `new_scale`.
pub fn translate_to_keep(content: Point, new_scale: f64, focal: Point, anchor: Point) -> (f64, f64) {
    (
        focal.x - anchor.x - content.x * new_scale,
        focal.y - anchor.y - content.y * new_scale,
    )
}

/// Rescale so the content point under `focal` stays under that exact screen
/// point. Callers clamp `new_scale` first.
pub fn rescale_around_point(
    current: &Viewport,
    new_scale: f64,
    focal: Point,
    anchor: Point,
) -> Viewport {
    let content = content_point_under(current, focal, anchor);
    let (tx, ty) = translate_to_keep(content, new_scale, focal, anchor);
    Viewport {
        scale: new_scale,
        translate_x: tx,
        translate_y: ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_pos(vp: &Viewport, content: Point, anchor: Point) -> Point {
        Point {
            x: anchor.x + vp.translate_x + content.x * vp.scale,
            y: anchor.y + vp.translate_y + content.y * vp.scale,
        }
    }

    #[test]
    fn clamp_scale_is_idempotent() {
        for x in [-1.0, 0.3, 0.5, 1.7, 5.0, 9.9] {
            let once = clamp_scale(x, 0.5, 5.0);
            assert_eq!(clamp_scale(once, 0.5, 5.0), once);
        }
    }

    #[test]
    fn fit_scale_clamps_to_bounds() {
        // Huge container would overshoot the max clamp.
        assert_eq!(fit_scale(100.0, 10_000.0, 16.0, 0.95, 0.8, 3.0), 3.0);
        // Tiny container undershoots the min clamp.
        assert_eq!(fit_scale(1000.0, 100.0, 16.0, 0.95, 0.8, 3.0), 0.8);
        // Degenerate content width falls back to the min clamp.
        assert_eq!(fit_scale(0.0, 800.0, 16.0, 0.95, 0.8, 3.0), 0.8);
    }

    #[test]
    fn fit_scale_uses_padding_and_factor() {
        let scale = fit_scale(500.0, 516.0, 16.0, 0.95, 0.1, 3.0);
        assert!((scale - 0.95).abs() < 1e-12);
    }

    #[test]
    fn rescale_keeps_focal_point_fixed() {
        let anchor = Point::new(40.0, 12.0);
        let focals = [
            Point::new(0.0, 0.0),
            Point::new(123.0, 456.0),
            Point::new(-30.0, 900.5),
        ];
        let mut vp = Viewport {
            scale: 1.3,
            translate_x: -57.0,
            translate_y: 211.0,
        };
        for new_scale in [0.5, 0.9, 1.3, 2.4, 5.0] {
            for focal in focals {
                let content = content_point_under(&vp, focal, anchor);
                let next = rescale_around_point(&vp, new_scale, focal, anchor);
                let after = screen_pos(&next, content, anchor);
                assert!((after.x - focal.x).abs() < 0.5, "x drifted at {new_scale}");
                assert!((after.y - focal.y).abs() < 0.5, "y drifted at {new_scale}");
                vp = next;
            }
        }
    }

    #[test]
    fn rescale_split_helpers_match_combined() {
        let vp = Viewport {
            scale: 2.0,
            translate_x: 10.0,
            translate_y: -4.0,
        };
        let focal = Point::new(80.0, 60.0);
        let anchor = Point::new(5.0, 5.0);
        let content = content_point_under(&vp, focal, anchor);
        let (tx, ty) = translate_to_keep(content, 3.0, focal, anchor);
        let combined = rescale_around_point(&vp, 3.0, focal, anchor);
        assert!((combined.translate_x - tx).abs() < 1e-12);
        assert!((combined.translate_y - ty).abs() < 1e-12);
    }
}
