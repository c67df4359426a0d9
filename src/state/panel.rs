//! Open/close lifecycle and responsive layout state for the two side panels
//! (desktop sidebars / mobile bottom sheets). Pure state: the DOM work
//! (positioning, transitions, scroll lock) is applied by `components::shell`
//! through the scroll-lock observer and the values returned here.

use std::rc::Rc;

use crate::util::MOBILE_BREAKPOINT_PX;

/// Duration of the sheet close/revert animation. The matching CSS transition
/// must use the same value; completion is inferred by a timer of this length.
pub const SHEET_CLOSE_DURATION_MS: i32 = 300;
/// After opening a sheet, outside taps are ignored for this long so the tap
/// that opened it cannot immediately close it.
pub const OUTSIDE_TAP_GRACE_MS: i32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    Left,
    Right,
}

impl PanelId {
    pub fn element_id(&self) -> &'static str {
        match self {
            PanelId::Left => "sidebar-left",
            PanelId::Right => "sidebar-right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl PanelState {
    fn is_presented(&self) -> bool {
        matches!(self, PanelState::Opening | PanelState::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width: f64) -> Self {
        if width <= MOBILE_BREAKPOINT_PX {
            Breakpoint::Mobile
        } else {
            Breakpoint::Desktop
        }
    }
}

/// Combined layout class derived from both sidebars' collapsed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarLayout {
    Neither,
    LeftCollapsed,
    RightCollapsed,
    BothCollapsed,
}

impl SidebarLayout {
    fn from_flags(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, true) => SidebarLayout::BothCollapsed,
            (true, false) => SidebarLayout::LeftCollapsed,
            (false, true) => SidebarLayout::RightCollapsed,
            (false, false) => SidebarLayout::Neither,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            SidebarLayout::Neither => "",
            SidebarLayout::LeftCollapsed => "left-collapsed",
            SidebarLayout::RightCollapsed => "right-collapsed",
            SidebarLayout::BothCollapsed => "both-collapsed",
        }
    }
}

pub struct PanelPresence {
    left: PanelState,
    right: PanelState,
    overlay: bool,
    left_collapsed: bool,
    right_collapsed: bool,
    breakpoint: Breakpoint,
    observers: Vec<Rc<dyn Fn(bool)>>,
    last_lock: bool,
}

impl PanelPresence {
    pub fn new(width: f64) -> Self {
        let breakpoint = Breakpoint::from_width(width);
        let mut presence = Self {
            left: PanelState::Closed,
            right: PanelState::Closed,
            overlay: false,
            left_collapsed: false,
            right_collapsed: false,
            breakpoint,
            observers: Vec::new(),
            last_lock: false,
        };
        presence.last_lock = presence.scroll_lock();
        presence
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn is_mobile(&self) -> bool {
        self.breakpoint == Breakpoint::Mobile
    }

    pub fn state(&self, id: PanelId) -> PanelState {
        match id {
            PanelId::Left => self.left,
            PanelId::Right => self.right,
        }
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay
    }

    pub fn presented(&self, id: PanelId) -> bool {
        self.state(id).is_presented()
    }

    pub fn collapsed(&self, id: PanelId) -> bool {
        match id {
            PanelId::Left => self.left_collapsed,
            PanelId::Right => self.right_collapsed,
        }
    }

    pub fn any_presented(&self) -> bool {
        self.left.is_presented() || self.right.is_presented()
    }

    pub fn sidebar_layout(&self) -> SidebarLayout {
        SidebarLayout::from_flags(self.left_collapsed, self.right_collapsed)
    }

    /// Body scroll is locked whenever the mobile layout is active, or on
    /// desktop while a panel or the overlay is presented.
    pub fn scroll_lock(&self) -> bool {
        match self.breakpoint {
            Breakpoint::Mobile => true,
            Breakpoint::Desktop => self.any_presented() || self.overlay,
        }
    }

    /// Observer is called with the new lock value whenever it changes, and
    /// once immediately with the current value.
    pub fn subscribe(&mut self, observer: Rc<dyn Fn(bool)>) {
        observer(self.last_lock);
        self.observers.push(observer);
    }

    fn notify(&mut self) {
        let lock = self.scroll_lock();
        if lock != self.last_lock {
            self.last_lock = lock;
            for observer in &self.observers {
                observer(lock);
            }
        }
    }

    pub fn open(&mut self, id: PanelId) {
        *self.slot(id) = PanelState::Opening;
        if self.breakpoint == Breakpoint::Desktop {
            self.overlay = true;
        }
        self.notify();
    }

    /// The open animation finished.
    pub fn opened(&mut self, id: PanelId) {
        if self.state(id) == PanelState::Opening {
            *self.slot(id) = PanelState::Open;
            self.notify();
        }
    }

    /// Begin closing every presented panel; returns the panels that must run
    /// the close animation. The overlay hides immediately on desktop.
    pub fn begin_close(&mut self) -> Vec<PanelId> {
        let mut closing = Vec::new();
        for id in [PanelId::Left, PanelId::Right] {
            if self.state(id).is_presented() {
                *self.slot(id) = PanelState::Closing;
                closing.push(id);
            }
        }
        if self.breakpoint == Breakpoint::Desktop {
            self.overlay = false;
        }
        self.notify();
        closing
    }

    /// The close animation finished. Returns whether the panel actually
    /// transitioned to `Closed`; a panel re-opened while the close timer was
    /// pending stays presented and its styling must be left alone.
    pub fn finish_close(&mut self, id: PanelId) -> bool {
        if self.state(id) == PanelState::Closing {
            *self.slot(id) = PanelState::Closed;
            self.notify();
            true
        } else {
            false
        }
    }

    /// Record a new window width. Crossing the mobile/desktop threshold
    /// forces every panel back to `Closed`: panel geometry computed for one
    /// mode is invalid in the other. Returns whether the threshold was
    /// crossed (the caller then clears inline geometry).
    pub fn set_width(&mut self, width: f64) -> bool {
        let next = Breakpoint::from_width(width);
        if next == self.breakpoint {
            return false;
        }
        self.breakpoint = next;
        self.left = PanelState::Closed;
        self.right = PanelState::Closed;
        self.overlay = false;
        self.notify();
        true
    }

    /// Desktop only; a no-op on mobile. Returns the new combined layout and
    /// whether the toggled side is now collapsed (for the affordance glyph).
    pub fn toggle_sidebar(&mut self, id: PanelId) -> Option<(SidebarLayout, bool)> {
        if self.breakpoint == Breakpoint::Mobile {
            return None;
        }
        let flag = match id {
            PanelId::Left => &mut self.left_collapsed,
            PanelId::Right => &mut self.right_collapsed,
        };
        *flag = !*flag;
        let collapsed = *flag;
        Some((self.sidebar_layout(), collapsed))
    }

    fn slot(&mut self, id: PanelId) -> &mut PanelState {
        match id {
            PanelId::Left => &mut self.left,
            PanelId::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closing_passes_through_closing_before_closed() {
        let mut p = PanelPresence::new(400.0);
        p.open(PanelId::Left);
        p.opened(PanelId::Left);
        assert_eq!(p.state(PanelId::Left), PanelState::Open);
        let closing = p.begin_close();
        assert_eq!(closing, vec![PanelId::Left]);
        assert_eq!(p.state(PanelId::Left), PanelState::Closing);
        p.finish_close(PanelId::Left);
        assert_eq!(p.state(PanelId::Left), PanelState::Closed);
    }

    #[test]
    fn reopening_during_close_invalidates_the_pending_finish() {
        let mut p = PanelPresence::new(400.0);
        p.open(PanelId::Left);
        p.opened(PanelId::Left);
        p.begin_close();
        // Re-opened before the close animation's timer fired: the stale
        // finish must not complete (its caller skips the style cleanup).
        p.open(PanelId::Left);
        assert!(!p.finish_close(PanelId::Left));
        assert_eq!(p.state(PanelId::Left), PanelState::Opening);
        // A subsequent full close still lands.
        p.begin_close();
        assert!(p.finish_close(PanelId::Left));
        assert_eq!(p.state(PanelId::Left), PanelState::Closed);
    }

    #[test]
    fn breakpoint_crossing_resets_open_panels() {
        let mut p = PanelPresence::new(800.0);
        p.open(PanelId::Right);
        p.opened(PanelId::Right);
        assert!(p.set_width(700.0));
        assert_eq!(p.state(PanelId::Right), PanelState::Closed);
        assert!(!p.overlay_active());
        assert_eq!(p.breakpoint(), Breakpoint::Mobile);
    }

    #[test]
    fn resize_within_a_mode_does_not_reset() {
        let mut p = PanelPresence::new(400.0);
        p.open(PanelId::Left);
        assert!(!p.set_width(500.0));
        assert_eq!(p.state(PanelId::Left), PanelState::Opening);
    }

    #[test]
    fn overlay_shows_only_on_desktop_open() {
        let mut desktop = PanelPresence::new(1200.0);
        desktop.open(PanelId::Left);
        assert!(desktop.overlay_active());
        desktop.begin_close();
        assert!(!desktop.overlay_active());

        let mut mobile = PanelPresence::new(400.0);
        mobile.open(PanelId::Left);
        assert!(!mobile.overlay_active());
    }

    #[test]
    fn scroll_lock_rules() {
        let mut mobile = PanelPresence::new(400.0);
        assert!(mobile.scroll_lock());

        let mut desktop = PanelPresence::new(1200.0);
        assert!(!desktop.scroll_lock());
        desktop.open(PanelId::Left);
        assert!(desktop.scroll_lock());
        desktop.begin_close();
        desktop.finish_close(PanelId::Left);
        assert!(!desktop.scroll_lock());

        // Crossing to desktop with everything closed releases the lock.
        assert!(mobile.set_width(900.0));
        assert!(!mobile.scroll_lock());
    }

    #[test]
    fn scroll_lock_observer_fires_on_changes_only() {
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let mut p = PanelPresence::new(1200.0);
        {
            let seen = seen.clone();
            p.subscribe(Rc::new(move |lock| seen.borrow_mut().push(lock)));
        }
        p.open(PanelId::Left); // false -> true
        p.opened(PanelId::Left); // still true, no event
        p.begin_close(); // overlay off but panel Closing: desktop lock drops
        p.finish_close(PanelId::Left);
        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn sidebar_toggle_builds_combined_layout_class() {
        let mut p = PanelPresence::new(1200.0);
        let (layout, collapsed) = p.toggle_sidebar(PanelId::Left).unwrap();
        assert_eq!(layout, SidebarLayout::LeftCollapsed);
        assert!(collapsed);
        let (layout, _) = p.toggle_sidebar(PanelId::Right).unwrap();
        assert_eq!(layout, SidebarLayout::BothCollapsed);
        assert_eq!(layout.class(), "both-collapsed");
        let (layout, collapsed) = p.toggle_sidebar(PanelId::Left).unwrap();
        assert_eq!(layout, SidebarLayout::RightCollapsed);
        assert!(!collapsed);
    }

    #[test]
    fn sidebar_toggle_is_noop_on_mobile() {
        let mut p = PanelPresence::new(500.0);
        assert!(p.toggle_sidebar(PanelId::Left).is_none());
    }

    #[test]
    fn collapsed_flags_survive_breakpoint_crossings() {
        let mut p = PanelPresence::new(1200.0);
        p.toggle_sidebar(PanelId::Left);
        p.set_width(500.0);
        p.set_width(1200.0);
        assert_eq!(p.sidebar_layout(), SidebarLayout::LeftCollapsed);
    }
}
