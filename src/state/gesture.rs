//! Gesture state machine for the document viewer.
//!
//! Unifies mouse drag, single-touch drag and two-touch pinch over one
//! viewport. Wheel zoom is handled synchronously by the component (it needs
//! to interleave a re-render between the scale change and the translate fix)
//! using the helpers in [`super::viewport`]; the controller only exposes
//! `zoom_to`/`set_translate` for it.

use super::viewport::{Point, Viewport, clamp_scale};

/// Additive scale step for a modifier-gated wheel tick.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;
/// Additive scale step for the zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl ScaleLimits {
    pub fn clamp(&self, scale: f64) -> f64 {
        clamp_scale(scale, self.min, self.max)
    }
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: 0.5, max: 5.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSession {
    Idle,
    Dragging { anchor: Point, origin: Viewport },
    Pinching { initial_distance: f64, initial_scale: f64 },
}

/// What the display has to do after an accepted gesture update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Nothing changed.
    None,
    /// Only the translate changed; a CSS transform update is enough.
    Reposition,
    /// The scale changed; content must be re-rasterized at the new scale.
    Rasterize,
}

pub struct PointerGestureController {
    viewport: Viewport,
    limits: ScaleLimits,
    session: GestureSession,
    user_scaled: bool,
}

impl PointerGestureController {
    pub fn new(limits: ScaleLimits) -> Self {
        Self {
            viewport: Viewport::default(),
            limits,
            session: GestureSession::Idle,
            user_scaled: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    pub fn session(&self) -> GestureSession {
        self.session
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.session, GestureSession::Dragging { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.session, GestureSession::Pinching { .. })
    }

    /// True once the user explicitly changed the scale; a resize then keeps
    /// the current scale instead of recomputing the fit.
    pub fn user_scaled(&self) -> bool {
        self.user_scaled
    }

    /// Reset on content (re)load: fit scale, translate (0,0), no session.
    pub fn reset_to_fit(&mut self, fit: f64) {
        self.viewport = Viewport::at_scale(self.limits.clamp(fit));
        self.session = GestureSession::Idle;
        self.user_scaled = false;
    }

    pub fn begin_drag(&mut self, at: Point) {
        self.session = GestureSession::Dragging {
            anchor: at,
            origin: self.viewport,
        };
    }

    pub fn drag_to(&mut self, point: Point) -> RenderRequest {
        let GestureSession::Dragging { anchor, origin } = self.session else {
            return RenderRequest::None;
        };
        self.viewport.translate_x = origin.translate_x + (point.x - anchor.x);
        self.viewport.translate_y = origin.translate_y + (point.y - anchor.y);
        RenderRequest::Reposition
    }

    pub fn end_drag(&mut self) {
        if self.is_dragging() {
            self.session = GestureSession::Idle;
        }
    }

    /// A second touch point pre-empts any drag in progress; the drag's last
    /// applied translate is kept, not rolled back.
    pub fn begin_pinch(&mut self, a: Point, b: Point) {
        let distance = a.distance_to(b);
        if distance <= 0.0 {
            return;
        }
        self.session = GestureSession::Pinching {
            initial_distance: distance,
            initial_scale: self.viewport.scale,
        };
    }

    /// Center-agnostic pinch: scale is the session-start scale times the
    /// distance ratio; translate is untouched.
    pub fn pinch_to(&mut self, a: Point, b: Point) -> RenderRequest {
        let GestureSession::Pinching {
            initial_distance,
            initial_scale,
        } = self.session
        else {
            return RenderRequest::None;
        };
        let distance = a.distance_to(b);
        if distance <= 0.0 {
            return RenderRequest::None;
        }
        let new_scale = self.limits.clamp(initial_scale * distance / initial_distance);
        if new_scale == self.viewport.scale {
            return RenderRequest::None;
        }
        self.viewport.scale = new_scale;
        self.user_scaled = true;
        RenderRequest::Rasterize
    }

    /// Touch count dropped below two. A single remaining touch does NOT
    /// become a drag; relocating the anchor mid-gesture is jarring.
    pub fn touches_released(&mut self, remaining: u32) {
        match self.session {
            GestureSession::Pinching { .. } if remaining < 2 => {
                self.session = GestureSession::Idle;
            }
            GestureSession::Dragging { .. } if remaining == 0 => {
                self.session = GestureSession::Idle;
            }
            _ => {}
        }
    }

    /// Abandon whatever session is in flight, keeping the last applied state.
    pub fn cancel(&mut self) {
        self.session = GestureSession::Idle;
    }

    /// Clamped scale change from wheel ticks or zoom buttons. Returns the
    /// render request; the caller re-anchors the translate afterwards.
    pub fn zoom_to(&mut self, scale: f64) -> RenderRequest {
        let new_scale = self.limits.clamp(scale);
        if new_scale == self.viewport.scale {
            return RenderRequest::None;
        }
        self.viewport.scale = new_scale;
        self.user_scaled = true;
        RenderRequest::Rasterize
    }

    /// Refit after a container resize: adopts the new fit scale but keeps the
    /// translate and does not count as a user zoom.
    pub fn set_fit_scale(&mut self, fit: f64) {
        self.viewport.scale = self.limits.clamp(fit);
    }

    pub fn set_translate(&mut self, x: f64, y: f64) {
        self.viewport.translate_x = x;
        self.viewport.translate_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PointerGestureController {
        PointerGestureController::new(ScaleLimits::default())
    }

    #[test]
    fn drag_applies_pointer_delta_without_scaling() {
        let mut c = controller();
        c.begin_drag(Point::new(100.0, 100.0));
        let req = c.drag_to(Point::new(130.0, 160.0));
        assert_eq!(req, RenderRequest::Reposition);
        let vp = c.viewport();
        assert_eq!((vp.translate_x, vp.translate_y), (30.0, 60.0));
        assert_eq!(vp.scale, 1.0);
        c.end_drag();
        assert_eq!(c.session(), GestureSession::Idle);
    }

    #[test]
    fn drag_delta_is_relative_to_session_origin() {
        let mut c = controller();
        c.set_translate(10.0, -5.0);
        c.begin_drag(Point::new(0.0, 0.0));
        c.drag_to(Point::new(3.0, 4.0));
        c.drag_to(Point::new(6.0, 8.0));
        let vp = c.viewport();
        assert_eq!((vp.translate_x, vp.translate_y), (16.0, 3.0));
    }

    #[test]
    fn pinch_scales_by_distance_ratio() {
        let mut c = controller();
        c.begin_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let req = c.pinch_to(Point::new(0.0, 0.0), Point::new(200.0, 0.0));
        assert_eq!(req, RenderRequest::Rasterize);
        assert_eq!(c.viewport().scale, 2.0);

        let mut c = controller();
        c.begin_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        c.pinch_to(Point::new(0.0, 0.0), Point::new(50.0, 0.0));
        assert_eq!(c.viewport().scale, 0.5);
    }

    #[test]
    fn pinch_clamps_to_scale_limits() {
        let mut c = PointerGestureController::new(ScaleLimits { min: 0.8, max: 1.5 });
        c.begin_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        c.pinch_to(Point::new(0.0, 0.0), Point::new(400.0, 0.0));
        assert_eq!(c.viewport().scale, 1.5);
        c.pinch_to(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(c.viewport().scale, 0.8);
    }

    #[test]
    fn zero_distance_pinch_is_ignored() {
        let mut c = controller();
        c.begin_pinch(Point::new(50.0, 50.0), Point::new(50.0, 50.0));
        assert_eq!(c.session(), GestureSession::Idle);

        c.begin_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let req = c.pinch_to(Point::new(50.0, 50.0), Point::new(50.0, 50.0));
        assert_eq!(req, RenderRequest::None);
        assert_eq!(c.viewport().scale, 1.0);
    }

    #[test]
    fn second_touch_preempts_drag_and_keeps_partial_translate() {
        let mut c = controller();
        c.begin_drag(Point::new(0.0, 0.0));
        c.drag_to(Point::new(25.0, 10.0));
        c.begin_pinch(Point::new(0.0, 0.0), Point::new(80.0, 0.0));
        assert!(c.is_pinching());
        assert_eq!(c.viewport().translate_x, 25.0);
    }

    #[test]
    fn single_remaining_touch_does_not_resume_dragging() {
        let mut c = controller();
        c.begin_pinch(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        c.touches_released(1);
        assert_eq!(c.session(), GestureSession::Idle);
        // A move with no session is a no-op.
        assert_eq!(c.drag_to(Point::new(10.0, 10.0)), RenderRequest::None);
    }

    #[test]
    fn zoom_to_clamps_and_marks_user_scaled() {
        let mut c = controller();
        assert!(!c.user_scaled());
        assert_eq!(c.zoom_to(9.0), RenderRequest::Rasterize);
        assert_eq!(c.viewport().scale, 5.0);
        assert!(c.user_scaled());
        // Already pinned at max: no work requested.
        assert_eq!(c.zoom_to(5.0 + WHEEL_ZOOM_STEP), RenderRequest::None);
    }

    #[test]
    fn reset_to_fit_clears_session_and_translate() {
        let mut c = controller();
        c.begin_drag(Point::new(0.0, 0.0));
        c.drag_to(Point::new(40.0, 40.0));
        c.zoom_to(2.0);
        c.reset_to_fit(1.2);
        let vp = c.viewport();
        assert_eq!((vp.scale, vp.translate_x, vp.translate_y), (1.2, 0.0, 0.0));
        assert_eq!(c.session(), GestureSession::Idle);
        assert!(!c.user_scaled());
    }

    #[test]
    fn refit_keeps_translate_and_user_scaled_flag() {
        let mut c = controller();
        c.set_translate(7.0, -3.0);
        c.set_fit_scale(1.4);
        let vp = c.viewport();
        assert_eq!((vp.scale, vp.translate_x, vp.translate_y), (1.4, 7.0, -3.0));
        assert!(!c.user_scaled());
    }

    #[test]
    fn cancel_abandons_session_without_rollback() {
        let mut c = controller();
        c.begin_drag(Point::new(0.0, 0.0));
        c.drag_to(Point::new(12.0, 0.0));
        c.cancel();
        assert_eq!(c.session(), GestureSession::Idle);
        assert_eq!(c.viewport().translate_x, 12.0);
    }
}
