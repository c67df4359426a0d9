//! Vertical swipe-to-dismiss state machine for the mobile bottom sheets.
//!
//! The controller works on distilled inputs (touch y, timestamps, a probe of
//! the nested scrollable region); the component decides which touches qualify
//! (header title region only, mobile layout, panel open) and applies the
//! returned transforms.

use super::panel::PanelId;

/// Drag distance that commits a close on its own.
pub const SWIPE_CLOSE_DISTANCE_PX: f64 = 100.0;
/// Shorter distance that still commits when paired with a fast downward swipe.
pub const SWIPE_ASSIST_DISTANCE_PX: f64 = 50.0;
/// Velocity threshold for the fast-swipe rule, px per ms, downward positive.
pub const SWIPE_VELOCITY_PX_PER_MS: f64 = 0.5;
/// Upward movement is clamped here so the sheet never detaches from its
/// bottom anchor.
pub const SHEET_MAX_UPWARD_PX: f64 = -50.0;

/// Scroll metrics of the nested scrollable content under the touch point,
/// sampled by the component on each event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollProbe {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollProbe {
    fn is_scrollable(&self) -> bool {
        self.scroll_height > self.client_height
    }

    fn at_top(&self) -> bool {
        self.scroll_top <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SheetDragSession {
    panel: PanelId,
    start_y: f64,
    current_y: f64,
    last_y: f64,
    last_sample_ms: f64,
    velocity: f64,
    /// Last offset actually applied to the panel, used to rebase the session
    /// when control is regained after yielding to a nested scroll.
    applied_offset: f64,
    /// Native scrolling currently owns the gesture.
    yielded: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum SheetDrag {
    Idle,
    /// Touch accepted, no move sample yet.
    Armed(SheetDragSession),
    Dragging(SheetDragSession),
}

/// Per-sample instruction for the component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetMove {
    /// Not tracking, or native scroll has priority; do not preventDefault.
    Ignored,
    /// Apply `translateY(offset)` with transitions disabled.
    Track { panel: PanelId, offset: f64 },
}

/// Decision consumed exactly once at touch end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetRelease {
    Commit(PanelId),
    Revert(PanelId),
}

#[derive(Default)]
pub struct SheetDragController {
    drag: SheetDrag,
}

impl Default for SheetDrag {
    fn default() -> Self {
        SheetDrag::Idle
    }
}

impl SheetDragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.drag, SheetDrag::Idle)
    }

    pub fn panel(&self) -> Option<PanelId> {
        match &self.drag {
            SheetDrag::Idle => None,
            SheetDrag::Armed(s) | SheetDrag::Dragging(s) => Some(s.panel),
        }
    }

    /// Qualifying touch landed on an open sheet. `applied_offset` is the
    /// translateY already on the panel, so a drag starting mid-animation
    /// continues from where the panel visually is. Returns false when the
    /// nested content is scrolled away from its top edge (scroll priority).
    pub fn arm(
        &mut self,
        panel: PanelId,
        touch_y: f64,
        applied_offset: f64,
        scroll: Option<&ScrollProbe>,
        now_ms: f64,
    ) -> bool {
        if let Some(probe) = scroll {
            if probe.is_scrollable() && !probe.at_top() {
                return false;
            }
        }
        self.drag = SheetDrag::Armed(SheetDragSession {
            panel,
            start_y: touch_y - applied_offset,
            current_y: touch_y,
            last_y: touch_y,
            last_sample_ms: now_ms,
            velocity: 0.0,
            applied_offset,
            yielded: false,
        });
        true
    }

    /// One touch-move sample. Keeps only the most recent velocity sample.
    pub fn sample(&mut self, touch_y: f64, now_ms: f64, scroll: Option<&ScrollProbe>) -> SheetMove {
        let session = match std::mem::take(&mut self.drag) {
            SheetDrag::Idle => return SheetMove::Ignored,
            SheetDrag::Armed(s) | SheetDrag::Dragging(s) => s,
        };
        let mut s = session;

        // Scroll-priority arbitration: while the nested content is scrolled
        // away from its top edge, native scrolling owns the gesture. Control
        // returns once the content is back at the top and the finger moves in
        // the closing (downward) direction; the session is rebased so the
        // sheet does not jump.
        if let Some(probe) = scroll {
            if probe.is_scrollable() && !probe.at_top() {
                s.yielded = true;
            } else if s.yielded {
                if touch_y > s.last_y {
                    s.start_y = touch_y - s.applied_offset;
                    s.yielded = false;
                }
            }
        }

        let elapsed = now_ms - s.last_sample_ms;
        if elapsed > 0.0 {
            s.velocity = (touch_y - s.last_y) / elapsed;
        }
        s.last_y = touch_y;
        s.last_sample_ms = now_ms;
        s.current_y = touch_y;

        if s.yielded {
            self.drag = SheetDrag::Dragging(s);
            return SheetMove::Ignored;
        }

        let delta_y = s.current_y - s.start_y;
        let offset = delta_y.max(SHEET_MAX_UPWARD_PX);
        s.applied_offset = offset;
        let panel = s.panel;
        self.drag = SheetDrag::Dragging(s);
        SheetMove::Track { panel, offset }
    }

    /// Touch ended: decide commit vs revert. The session is cleared before
    /// the decision is returned so follow-up effects cannot re-enter it.
    pub fn release(&mut self) -> Option<SheetRelease> {
        let s = match std::mem::take(&mut self.drag) {
            SheetDrag::Idle => return None,
            SheetDrag::Armed(s) | SheetDrag::Dragging(s) => s,
        };
        let delta_y = s.current_y - s.start_y;
        let fast_downward =
            s.velocity.abs() > SWIPE_VELOCITY_PX_PER_MS && s.velocity > 0.0;
        let commit = delta_y > SWIPE_CLOSE_DISTANCE_PX
            || (delta_y > SWIPE_ASSIST_DISTANCE_PX && fast_downward);
        Some(if commit {
            SheetRelease::Commit(s.panel)
        } else {
            SheetRelease::Revert(s.panel)
        })
    }

    /// Interrupted touch (competing system gesture): revert exactly like a
    /// non-committing release.
    pub fn cancel(&mut self) -> Option<SheetRelease> {
        let s = match std::mem::take(&mut self.drag) {
            SheetDrag::Idle => return None,
            SheetDrag::Armed(s) | SheetDrag::Dragging(s) => s,
        };
        Some(SheetRelease::Revert(s.panel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragged(controller: &mut SheetDragController, samples: &[(f64, f64)]) {
        for &(y, t) in samples {
            controller.sample(y, t, None);
        }
    }

    #[test]
    fn long_drag_commits_regardless_of_velocity() {
        let mut c = SheetDragController::new();
        assert!(c.arm(PanelId::Left, 100.0, 0.0, None, 0.0));
        // 120px over 1.2s: velocity ~0.1 px/ms.
        dragged(&mut c, &[(160.0, 600.0), (220.0, 1200.0)]);
        assert_eq!(c.release(), Some(SheetRelease::Commit(PanelId::Left)));
    }

    #[test]
    fn short_fast_swipe_commits_by_velocity() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Right, 100.0, 0.0, None, 0.0);
        // 60px in 75ms: velocity 0.8 px/ms on the last sample.
        dragged(&mut c, &[(130.0, 37.5), (160.0, 75.0)]);
        assert_eq!(c.release(), Some(SheetRelease::Commit(PanelId::Right)));
    }

    #[test]
    fn short_slow_drag_reverts() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Left, 100.0, 0.0, None, 0.0);
        // 40px over 400ms: velocity 0.1 px/ms.
        dragged(&mut c, &[(120.0, 200.0), (140.0, 400.0)]);
        assert_eq!(c.release(), Some(SheetRelease::Revert(PanelId::Left)));
    }

    #[test]
    fn fast_upward_swipe_never_commits() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Left, 300.0, 0.0, None, 0.0);
        dragged(&mut c, &[(240.0, 30.0)]);
        assert_eq!(c.release(), Some(SheetRelease::Revert(PanelId::Left)));
    }

    #[test]
    fn upward_movement_clamps_at_fifty_px() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Left, 300.0, 0.0, None, 0.0);
        let mv = c.sample(120.0, 16.0, None);
        assert_eq!(
            mv,
            SheetMove::Track {
                panel: PanelId::Left,
                offset: SHEET_MAX_UPWARD_PX
            }
        );
    }

    #[test]
    fn drag_starting_mid_animation_is_continuous() {
        let mut c = SheetDragController::new();
        // Panel already sits 80px down from a previous gesture.
        c.arm(PanelId::Left, 200.0, 80.0, None, 0.0);
        let mv = c.sample(200.0, 16.0, None);
        assert_eq!(
            mv,
            SheetMove::Track {
                panel: PanelId::Left,
                offset: 80.0
            }
        );
    }

    #[test]
    fn arm_refused_while_nested_content_is_scrolled() {
        let mut c = SheetDragController::new();
        let scrolled = ScrollProbe {
            scroll_top: 40.0,
            scroll_height: 900.0,
            client_height: 300.0,
        };
        assert!(!c.arm(PanelId::Left, 100.0, 0.0, Some(&scrolled), 0.0));
        assert!(!c.is_active());

        let at_top = ScrollProbe {
            scroll_top: 0.0,
            ..scrolled
        };
        assert!(c.arm(PanelId::Left, 100.0, 0.0, Some(&at_top), 0.0));
    }

    #[test]
    fn yields_to_nested_scroll_then_resumes_downward_at_top() {
        let mut c = SheetDragController::new();
        let at_top = ScrollProbe {
            scroll_top: 0.0,
            scroll_height: 900.0,
            client_height: 300.0,
        };
        c.arm(PanelId::Left, 100.0, 0.0, Some(&at_top), 0.0);
        let mv = c.sample(130.0, 16.0, Some(&at_top));
        assert_eq!(
            mv,
            SheetMove::Track {
                panel: PanelId::Left,
                offset: 30.0
            }
        );

        // Content scrolls: the controller stops driving the panel.
        let scrolled = ScrollProbe {
            scroll_top: 25.0,
            ..at_top
        };
        assert_eq!(c.sample(110.0, 32.0, Some(&scrolled)), SheetMove::Ignored);

        // Back at the top but still moving upward: still yielded.
        assert_eq!(c.sample(105.0, 48.0, Some(&at_top)), SheetMove::Ignored);

        // Downward at the top edge: control resumes, rebased to the offset
        // last applied so the sheet does not jump.
        let mv = c.sample(125.0, 64.0, Some(&at_top));
        assert_eq!(
            mv,
            SheetMove::Track {
                panel: PanelId::Left,
                offset: 30.0
            }
        );
        // Further downward movement now tracks from the rebased origin.
        let mv = c.sample(145.0, 80.0, Some(&at_top));
        assert_eq!(
            mv,
            SheetMove::Track {
                panel: PanelId::Left,
                offset: 50.0
            }
        );
    }

    #[test]
    fn release_consumes_the_session_exactly_once() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Left, 100.0, 0.0, None, 0.0);
        dragged(&mut c, &[(250.0, 100.0)]);
        assert!(c.release().is_some());
        assert!(c.release().is_none());
        assert!(!c.is_active());
    }

    #[test]
    fn armed_release_without_movement_reverts() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Right, 100.0, 0.0, None, 0.0);
        assert_eq!(c.release(), Some(SheetRelease::Revert(PanelId::Right)));
    }

    #[test]
    fn cancel_reverts_like_a_non_committing_release() {
        let mut c = SheetDragController::new();
        c.arm(PanelId::Left, 100.0, 0.0, None, 0.0);
        dragged(&mut c, &[(260.0, 50.0)]);
        assert_eq!(c.cancel(), Some(SheetRelease::Revert(PanelId::Left)));
        assert!(!c.is_active());
    }
}
