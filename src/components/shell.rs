//! DOM side of the panel lifecycle: bottom-sheet positioning, open/close
//! animation styling, layout classes and the body scroll lock. All state
//! decisions live in `state::panel`; these helpers only apply them.
//!
//! Missing anchor elements (header, video container, the sidebars themselves)
//! make the operation a silent no-op: layout cannot proceed without them and
//! none of this is worth failing the page over.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::state::panel::{PanelId, SidebarLayout};
use crate::util::parse_translate_y;

/// Easing shared by the sheet open/close/revert animations. Its 0.3s duration
/// must stay in sync with `panel::SHEET_CLOSE_DURATION_MS`.
pub const SHEET_EASING: &str = "transform 0.3s cubic-bezier(0.2, 0, 0, 1)";

pub const SHEET_ACTIVE_CLASS: &str = "bottom-sheet-active";

pub fn sidebar(document: &Document, id: PanelId) -> Option<HtmlElement> {
    document
        .get_element_by_id(id.element_id())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// translateY currently applied to the sheet, in px. `translateY(100%)` (the
/// primed off-screen state) and a clean element both read as 0.
pub fn current_sheet_offset(sidebar: &HtmlElement) -> f64 {
    let transform = sidebar
        .style()
        .get_property_value("transform")
        .unwrap_or_default();
    parse_translate_y(&transform).unwrap_or(0.0)
}

/// Anchor the sheet directly beneath the fixed header + video container and
/// prime it off-screen with transitions disabled, ready to slide up.
pub fn position_bottom_sheet(document: &Document, sidebar: &HtmlElement) {
    let Some(header) = query_html(document, "header") else {
        return;
    };
    let Some(video) = query_html(document, ".video-container") else {
        return;
    };
    let top = header.offset_height() + video.offset_height();
    let style = sidebar.style();
    let _ = style.set_property("top", &format!("{top}px"));
    let _ = style.set_property("bottom", "0");
    let _ = style.set_property("height", &format!("calc(100dvh - {top}px)"));
    let _ = style.set_property("transition", "none");
    let _ = style.set_property("transform", "translateY(100%)");
}

/// Resize within mobile: the header or video container may have changed size,
/// so only the anchored top offset and height are recomputed. The open
/// animation is not replayed.
pub fn refresh_sheet_anchor(document: &Document, sidebar: &HtmlElement) {
    let Some(header) = query_html(document, "header") else {
        return;
    };
    let Some(video) = query_html(document, ".video-container") else {
        return;
    };
    let top = header.offset_height() + video.offset_height();
    let style = sidebar.style();
    let _ = style.set_property("top", &format!("{top}px"));
    let _ = style.set_property("height", &format!("calc(100dvh - {top}px)"));
}

/// Force a layout flush so the primed styles are committed before the open
/// transition is enabled.
pub fn flush_layout(el: &HtmlElement) {
    let _ = el.offset_width();
}

/// Eased slide to a target transform (open: `translateY(0)`, close:
/// `translateY(100%)`, revert: `translateY(0)`).
pub fn animate_sheet_to(sidebar: &HtmlElement, transform: &str) {
    let style = sidebar.style();
    let _ = style.set_property("transition", SHEET_EASING);
    let _ = style.set_property("transform", transform);
}

/// Instant tracking during a drag: transitions disabled so the sheet follows
/// the finger without lag.
pub fn track_sheet(sidebar: &HtmlElement, offset_px: f64) {
    let style = sidebar.style();
    let _ = style.set_property("transition", "none");
    let _ = style.set_property("transform", &format!("translateY({offset_px}px)"));
}

pub fn mark_sheet_active(sidebar: &HtmlElement, active: bool) {
    let list = sidebar.class_list();
    if active {
        let _ = list.add_1(SHEET_ACTIVE_CLASS);
    } else {
        let _ = list.remove_1(SHEET_ACTIVE_CLASS);
    }
}

/// Clear every transient inline style a sheet picked up while open.
pub fn clear_sheet_styles(sidebar: &HtmlElement) {
    let _ = sidebar.remove_attribute("style");
}

/// Full reset used when the layout crosses the mobile/desktop threshold:
/// geometry computed for one mode must never survive into the other.
pub fn reset_bottom_sheets(document: &Document) {
    for id in [PanelId::Left, PanelId::Right] {
        if let Some(el) = sidebar(document, id) {
            mark_sheet_active(&el, false);
            clear_sheet_styles(&el);
            flush_layout(&el);
        }
    }
    set_overlay_active(document, false);
}

pub fn set_overlay_active(document: &Document, active: bool) {
    if let Some(overlay) = document.get_element_by_id("bottom-sheet-overlay") {
        let list = overlay.class_list();
        if active {
            let _ = list.add_1("active");
        } else {
            let _ = list.remove_1("active");
        }
    }
}

/// Desktop sidebar collapse: flip the element class and swap the combined
/// layout class so CSS can reflow the remaining space.
pub fn apply_sidebar_layout(document: &Document, id: PanelId, collapsed: bool, layout: SidebarLayout) {
    if let Some(el) = sidebar(document, id) {
        let list = el.class_list();
        if collapsed {
            let _ = list.add_1("collapsed");
        } else {
            let _ = list.remove_1("collapsed");
        }
    }
    if let Some(layout_el) = query_html(document, ".player-layout") {
        let list = layout_el.class_list();
        let _ = list.remove_3("left-collapsed", "right-collapsed", "both-collapsed");
        let class = layout.class();
        if !class.is_empty() {
            let _ = list.add_1(class);
        }
    }
}

pub fn apply_scroll_lock(locked: bool) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };
    let _ = body
        .style()
        .set_property("overflow", if locked { "hidden" } else { "" });
}

/// True when the event target sits inside `selector` (used for the gesture
/// qualification and outside-tap checks).
pub fn target_within(target: &Element, selector: &str) -> bool {
    target.closest(selector).ok().flatten().is_some()
}

/// True when a touch landed on a sheet's drag handle: the header itself or
/// its title element. Nested viewers, scrollable lists and interactive
/// controls never qualify; their own gestures win.
pub fn is_sheet_handle(target: &Element) -> bool {
    if target_within(target, "canvas, .pdf-viewer, button, a, input, select, textarea") {
        return false;
    }
    let Ok(Some(header)) = target.closest(".sidebar-header") else {
        return false;
    };
    if *target == header {
        return true;
    }
    match header.query_selector("h2, h3") {
        Ok(Some(title)) => title == *target || title.contains(Some(&**target)),
        _ => false,
    }
}
