//! Player page shell: course data loading, the embedded video player, the two
//! side panels (desktop sidebars / mobile bottom sheets) and the document
//! viewer wired into the right panel.
//!
//! Panel lifecycle decisions live in `state::panel`, swipe-to-dismiss in
//! `state::sheet`; this component owns the listeners and applies their
//! decisions through `shell`.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, KeyboardEvent, TouchEvent, Window};
use yew::prelude::*;

use super::document_view::DocumentView;
use super::lesson_list::LessonList;
use super::shell;
use crate::model::{self, UnitData};
use crate::state::panel::{
    OUTSIDE_TAP_GRACE_MS, PanelId, PanelPresence, SHEET_CLOSE_DURATION_MS,
};
use crate::state::sheet::{ScrollProbe, SheetDragController, SheetMove, SheetRelease};
use crate::util;
use crate::youtube;

const COURSE_DATA_URL: &str = "course_data.json";
/// Delay before an open sheet dismisses after a lesson tap, so the tap
/// feedback is visible before the sheet slides away.
const SELECT_DISMISS_DELAY_MS: i32 = 500;
/// Selector matching everything an "outside" tap must not be inside of.
const INSIDE_SELECTOR: &str =
    "#sidebar-left, #sidebar-right, .mobile-action-buttons, iframe";

#[derive(Clone, PartialEq)]
enum LoadState {
    Loading,
    Ready(UnitData),
    Failed(String),
}

fn query_param(window: &Window, name: &str) -> Option<String> {
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name)
}

/// Rewrite the `video` query parameter in place so a reload or share lands on
/// the same lesson. Subject and unit parameters are untouched.
fn push_video_param(window: &Window, number: u32) {
    let Ok(search) = window.location().search() else {
        return;
    };
    let Ok(params) = web_sys::UrlSearchParams::new_with_str(&search) else {
        return;
    };
    params.set("video", &number.to_string());
    if let Ok(history) = window.history() {
        let query = String::from(params.to_string());
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&format!("?{query}")));
    }
}

fn probe_scroll(el: &Element) -> ScrollProbe {
    ScrollProbe {
        scroll_top: el.scroll_top() as f64,
        scroll_height: el.scroll_height() as f64,
        client_height: el.client_height() as f64,
    }
}

/// Open one panel: bottom-sheet slide-up on mobile, overlay + active class on
/// desktop. Records the moment for the outside-tap grace window.
fn open_panel(
    presence: &Rc<RefCell<PanelPresence>>,
    opened_at: &Rc<RefCell<f64>>,
    document: &Document,
    window: &Window,
    id: PanelId,
) {
    presence.borrow_mut().open(id);
    *opened_at.borrow_mut() = util::now_ms();
    let Some(el) = shell::sidebar(document, id) else {
        return;
    };
    if presence.borrow().is_mobile() {
        shell::position_bottom_sheet(document, &el);
        shell::flush_layout(&el);
        shell::mark_sheet_active(&el, true);
        // Two frames so the primed off-screen transform is committed before
        // the transition is enabled.
        let slide = el.clone();
        util::next_frame(move || {
            util::next_frame(move || shell::animate_sheet_to(&slide, "translateY(0)"));
        });
        let presence = presence.clone();
        util::set_timeout(window, SHEET_CLOSE_DURATION_MS, move || {
            presence.borrow_mut().opened(id);
        });
    } else {
        shell::mark_sheet_active(&el, true);
        shell::set_overlay_active(document, presence.borrow().overlay_active());
        presence.borrow_mut().opened(id);
    }
}

/// Close every presented panel; transient styling is cleared only after the
/// close animation has run its fixed duration.
fn close_panels(presence: &Rc<RefCell<PanelPresence>>, document: &Document, window: &Window) {
    let closing = presence.borrow_mut().begin_close();
    if closing.is_empty() {
        return;
    }
    let mobile = presence.borrow().is_mobile();
    shell::set_overlay_active(document, presence.borrow().overlay_active());
    if mobile {
        for id in &closing {
            if let Some(el) = shell::sidebar(document, *id) {
                shell::animate_sheet_to(&el, "translateY(100%)");
            }
        }
    }
    let presence = presence.clone();
    let document = document.clone();
    util::set_timeout(window, SHEET_CLOSE_DURATION_MS, move || {
        for id in closing {
            // A panel re-opened while this timer was pending keeps its
            // styling; only a completed close is stripped.
            if !presence.borrow_mut().finish_close(id) {
                continue;
            }
            if let Some(el) = shell::sidebar(&document, id) {
                shell::mark_sheet_active(&el, false);
                shell::clear_sheet_styles(&el);
            }
        }
    });
}

#[function_component(App)]
pub fn app() -> Html {
    let window = web_sys::window().expect("no global `window` exists");

    let load = use_state_eq(|| LoadState::Loading);
    // None until the user picks a lesson or the URL names one; the first
    // ready video is the effective fallback.
    let current = {
        let window = window.clone();
        use_state_eq(move || {
            query_param(&window, "video").and_then(|v| v.parse::<u32>().ok())
        })
    };
    let left_collapsed = use_state_eq(|| false);
    let right_collapsed = use_state_eq(|| false);

    let presence = use_mut_ref(|| PanelPresence::new(util::window_width()));
    let sheet_drag = use_mut_ref(SheetDragController::new);
    // Scrollable region under the finger for the active sheet drag.
    let drag_scroll = use_mut_ref(|| None::<Element>);
    let player = use_mut_ref(|| None::<youtube::Player>);
    let pending_video = use_mut_ref(|| None::<String>);
    let opened_at = use_mut_ref(|| 0.0f64);

    // Fetch course data and pick the unit named by the query parameters.
    {
        let load = load.clone();
        let window = window.clone();
        use_effect_with((), move |_| {
            let subject = query_param(&window, "subject").unwrap_or_default();
            let unit = query_param(&window, "unit").unwrap_or_default();
            spawn_local(async move {
                let unit_data = match model::load_course_data(COURSE_DATA_URL).await {
                    Ok(data) => model::select_unit(&data, &subject, &unit),
                    Err(e) => Err(e),
                };
                match unit_data {
                    Ok(unit) => {
                        util::clog(&format!(
                            "loaded unit {} / {} ({} videos)",
                            unit.subject_name,
                            unit.unit_name,
                            unit.videos.len()
                        ));
                        load.set(LoadState::Ready(unit));
                    }
                    Err(e) => {
                        util::cerror(&format!("course data error: {e}"));
                        load.set(LoadState::Failed(
                            "コンテンツを読み込めませんでした。".to_string(),
                        ));
                    }
                }
            });
        });
    }

    // Create the embedded player once the unit is known, waiting for the
    // IFrame API when it has not loaded yet.
    {
        let player = player.clone();
        let pending_video = pending_video.clone();
        let current = *current;
        let window = window.clone();
        use_effect_with(load.clone(), move |load| {
            if let LoadState::Ready(unit) = &**load {
                if let Some(document) = window.document() {
                    document.set_title(&format!("{} {}", unit.subject_name, unit.unit_name));
                }
                let initial = current
                    .and_then(|n| unit.find_video(n))
                    .and_then(|v| v.youtube_id.clone())
                    .or_else(|| unit.videos.iter().find_map(|v| v.youtube_id.clone()));
                if player.borrow().is_none() {
                    if let Some(video_id) = initial {
                        let player = player.clone();
                        let pending_video = pending_video.clone();
                        let create = move || {
                            let id = pending_video
                                .borrow_mut()
                                .take()
                                .unwrap_or_else(|| video_id.clone());
                            *player.borrow_mut() =
                                Some(youtube::Player::new("player", &youtube::player_options(&id)));
                        };
                        if youtube::is_ready() {
                            create();
                        } else {
                            youtube::install_api(create);
                        }
                    }
                }
            }
            let player = player.clone();
            move || {
                if let Some(p) = player.borrow_mut().take() {
                    p.destroy();
                }
            }
        });
    }

    // Document-level listeners: sheet swipe, outside tap, Escape, resize,
    // plus the scroll-lock observer.
    {
        let presence = presence.clone();
        let sheet_drag = sheet_drag.clone();
        let drag_scroll = drag_scroll.clone();
        let opened_at = opened_at.clone();
        let window = window.clone();
        use_effect_with((), move |_| {
            let document = window.document().expect("window has no document");
            presence
                .borrow_mut()
                .subscribe(Rc::new(shell::apply_scroll_lock));

            let touch_start_cb = {
                let presence = presence.clone();
                let sheet_drag = sheet_drag.clone();
                let drag_scroll = drag_scroll.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    if !presence.borrow().is_mobile() {
                        return;
                    }
                    let Some(touch) = e.touches().item(0) else {
                        return;
                    };
                    let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok())
                    else {
                        return;
                    };
                    for id in [PanelId::Left, PanelId::Right] {
                        if !presence.borrow().presented(id) {
                            continue;
                        }
                        if !shell::target_within(&target, &format!("#{}", id.element_id())) {
                            continue;
                        }
                        // Only the header title region is a drag handle. A
                        // touch on the nested canvas, list or a control must
                        // never arm the dismiss drag.
                        if !shell::is_sheet_handle(&target) {
                            break;
                        }
                        let Some(el) = shell::sidebar(&document, id) else {
                            break;
                        };
                        let scroll_el = target.closest(".sidebar-content").ok().flatten();
                        let probe = scroll_el.as_ref().map(probe_scroll);
                        let armed = sheet_drag.borrow_mut().arm(
                            id,
                            touch.client_y() as f64,
                            shell::current_sheet_offset(&el),
                            probe.as_ref(),
                            util::now_ms(),
                        );
                        if armed {
                            *drag_scroll.borrow_mut() = scroll_el;
                        }
                        break;
                    }
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            let touch_move_cb = {
                let sheet_drag = sheet_drag.clone();
                let drag_scroll = drag_scroll.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    if !sheet_drag.borrow().is_active() {
                        return;
                    }
                    let Some(touch) = e.touches().item(0) else {
                        return;
                    };
                    let probe = drag_scroll.borrow().as_ref().map(probe_scroll);
                    let mv = sheet_drag.borrow_mut().sample(
                        touch.client_y() as f64,
                        util::now_ms(),
                        probe.as_ref(),
                    );
                    if let SheetMove::Track { panel, offset } = mv {
                        if e.cancelable() {
                            e.prevent_default();
                        }
                        if let Some(el) = shell::sidebar(&document, panel) {
                            shell::track_sheet(&el, offset);
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            let passive_off = web_sys::AddEventListenerOptions::new();
            passive_off.set_passive(false);
            document
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                    &passive_off,
                )
                .unwrap();

            let settle = {
                let presence = presence.clone();
                let drag_scroll = drag_scroll.clone();
                let document = document.clone();
                let window = window.clone();
                move |decision: Option<SheetRelease>| {
                    drag_scroll.borrow_mut().take();
                    match decision {
                        Some(SheetRelease::Commit(_)) => {
                            close_panels(&presence, &document, &window);
                        }
                        Some(SheetRelease::Revert(panel)) => {
                            if let Some(el) = shell::sidebar(&document, panel) {
                                shell::animate_sheet_to(&el, "translateY(0)");
                            }
                        }
                        None => {}
                    }
                }
            };
            let touch_end_cb = {
                let sheet_drag = sheet_drag.clone();
                let settle = settle.clone();
                Closure::wrap(Box::new(move |_e: TouchEvent| {
                    let decision = sheet_drag.borrow_mut().release();
                    settle(decision);
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())
                .unwrap();
            let touch_cancel_cb = {
                let sheet_drag = sheet_drag.clone();
                Closure::wrap(Box::new(move |_e: TouchEvent| {
                    let decision = sheet_drag.borrow_mut().cancel();
                    settle(decision);
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_cancel_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            let click_cb = {
                let presence = presence.clone();
                let opened_at = opened_at.clone();
                let document = document.clone();
                let window = window.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    if !presence.borrow().any_presented() {
                        return;
                    }
                    if util::now_ms() - *opened_at.borrow() < OUTSIDE_TAP_GRACE_MS as f64 {
                        return;
                    }
                    let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok())
                    else {
                        return;
                    };
                    if shell::target_within(&target, INSIDE_SELECTOR) {
                        return;
                    }
                    close_panels(&presence, &document, &window);
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback("click", click_cb.as_ref().unchecked_ref())
                .unwrap();

            let keydown_cb = {
                let presence = presence.clone();
                let document = document.clone();
                let window = window.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if e.key() == "Escape" {
                        close_panels(&presence, &document, &window);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .unwrap();

            let resize_cb = {
                let presence = presence.clone();
                let sheet_drag = sheet_drag.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    let crossed = presence.borrow_mut().set_width(util::window_width());
                    if crossed {
                        sheet_drag.borrow_mut().cancel();
                        shell::reset_bottom_sheets(&document);
                        let p = presence.borrow();
                        let layout = p.sidebar_layout();
                        for id in [PanelId::Left, PanelId::Right] {
                            shell::apply_sidebar_layout(&document, id, p.collapsed(id), layout);
                        }
                    } else if presence.borrow().is_mobile() {
                        for id in [PanelId::Left, PanelId::Right] {
                            if presence.borrow().presented(id) {
                                if let Some(el) = shell::sidebar(&document, id) {
                                    shell::refresh_sheet_anchor(&document, &el);
                                }
                            }
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .unwrap();

            let window_clone = window.clone();
            move || {
                let _ = document.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = document.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = document.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = document.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_cancel_cb.as_ref().unchecked_ref(),
                );
                let _ = document.remove_event_listener_with_callback(
                    "click",
                    click_cb.as_ref().unchecked_ref(),
                );
                let _ = document.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                let _keep_alive = (
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                    &touch_cancel_cb,
                    &click_cb,
                    &keydown_cb,
                    &resize_cb,
                );
            }
        });
    }

    let on_select = {
        let load = load.clone();
        let current = current.clone();
        let player = player.clone();
        let pending_video = pending_video.clone();
        let presence = presence.clone();
        let window = window.clone();
        Callback::from(move |number: u32| {
            let LoadState::Ready(unit) = &*load else {
                return;
            };
            let Some(video_id) = unit
                .find_video(number)
                .and_then(|v| v.youtube_id.clone())
            else {
                return;
            };
            current.set(Some(number));
            if let Some(p) = &*player.borrow() {
                p.load_video_by_id(&video_id);
            } else {
                *pending_video.borrow_mut() = Some(video_id);
            }
            push_video_param(&window, number);
            if presence.borrow().is_mobile() {
                if let Some(document) = window.document() {
                    // Keep the tapped lesson visible in the list.
                    if let Ok(Some(item)) = document
                        .query_selector(&format!(".lesson-item[data-number=\"{number}\"]"))
                    {
                        item.scroll_into_view();
                    }
                    let presence = presence.clone();
                    let window2 = window.clone();
                    util::set_timeout(&window, SELECT_DISMISS_DELAY_MS, move || {
                        close_panels(&presence, &document, &window2);
                    });
                }
            }
        })
    };

    let open_sheet = |id: PanelId| {
        let presence = presence.clone();
        let opened_at = opened_at.clone();
        let window = window.clone();
        Callback::from(move |e: MouseEvent| {
            // The same tap must not count as an outside tap.
            e.stop_propagation();
            if let Some(document) = window.document() {
                open_panel(&presence, &opened_at, &document, &window, id);
            }
        })
    };
    let open_left = open_sheet(PanelId::Left);
    let open_right = open_sheet(PanelId::Right);

    let close_all = {
        let presence = presence.clone();
        let window = window.clone();
        Callback::from(move |_e: MouseEvent| {
            if let Some(document) = window.document() {
                close_panels(&presence, &document, &window);
            }
        })
    };

    let toggle_sidebar = |id: PanelId, flag: UseStateHandle<bool>| {
        let presence = presence.clone();
        let window = window.clone();
        Callback::from(move |_e: MouseEvent| {
            let toggled = presence.borrow_mut().toggle_sidebar(id);
            if let Some((layout, collapsed)) = toggled {
                if let Some(document) = window.document() {
                    shell::apply_sidebar_layout(&document, id, collapsed, layout);
                }
                flag.set(collapsed);
            }
        })
    };
    let toggle_left = toggle_sidebar(PanelId::Left, left_collapsed.clone());
    let toggle_right = toggle_sidebar(PanelId::Right, right_collapsed.clone());

    let (header_title, current_number, current_video, pdf_path, videos) = match &*load {
        LoadState::Ready(unit) => {
            let number = (*current)
                .or_else(|| unit.videos.iter().find(|v| v.is_ready()).map(|v| v.video_number))
                .unwrap_or(1);
            let video = unit.find_video(number).cloned();
            let pdf = video
                .as_ref()
                .and_then(|v| unit.material_pdf_path(v));
            (
                format!("{} {}", unit.subject_name, unit.unit_name),
                number,
                video,
                pdf,
                unit.videos.clone(),
            )
        }
        _ => (String::from("動画授業"), 0, None, None, Vec::new()),
    };

    let main_body = match &*load {
        LoadState::Loading => html! {
            <div class="load-status">{"読み込み中..."}</div>
        },
        LoadState::Failed(message) => html! {
            <div class="load-status load-error">{ message.clone() }</div>
        },
        LoadState::Ready(_) => html! {
            <>
                <div class="video-container">
                    <div id="player"></div>
                </div>
                if let Some(video) = &current_video {
                    <div class="video-info">
                        <h2 class="video-title">{ &video.title }</h2>
                        if let Some(description) = &video.description {
                            <div class="video-description">
                                { for description.lines().map(|line| html! { <p>{ line }</p> }) }
                            </div>
                        }
                    </div>
                }
            </>
        },
    };

    html! {
        <>
            <header>
                <div class="header-left">
                    <a class="back-link" href="index.html">{"← 戻る"}</a>
                    <h1 class="unit-title">{ header_title }</h1>
                </div>
                <div class="mobile-action-buttons">
                    <button class="action-button" onclick={open_left.clone()}>{"レッスン一覧"}</button>
                    <button class="action-button" onclick={open_right.clone()}>{"教材"}</button>
                </div>
            </header>
            <div class="player-layout">
                <aside id="sidebar-left" class="sidebar">
                    <div class="sidebar-header">
                        <h2 class="sidebar-title">{"レッスン一覧"}</h2>
                        <button class="collapse-toggle" onclick={toggle_left}>
                            { if *left_collapsed { "▶" } else { "◀" } }
                        </button>
                        <button class="sheet-close" onclick={close_all.clone()}>{"✕"}</button>
                    </div>
                    <div class="sidebar-content">
                        <LessonList
                            videos={videos}
                            current={current_number}
                            on_select={on_select}
                        />
                    </div>
                </aside>
                <main class="main-content">
                    { main_body }
                </main>
                <aside id="sidebar-right" class="sidebar">
                    <div class="sidebar-header">
                        <h2 class="sidebar-title">{"教材"}</h2>
                        <button class="collapse-toggle" onclick={toggle_right}>
                            { if *right_collapsed { "◀" } else { "▶" } }
                        </button>
                        <button class="sheet-close" onclick={close_all.clone()}>{"✕"}</button>
                    </div>
                    <div class="sidebar-content">
                        if let Some(path) = pdf_path {
                            <DocumentView key={path.clone()} pdf_path={path.clone()} />
                        } else {
                            <div class="material-placeholder">{"このレッスンの教材はありません"}</div>
                        }
                    </div>
                </aside>
            </div>
            <div id="bottom-sheet-overlay" onclick={close_all}></div>
        </>
    }
}
