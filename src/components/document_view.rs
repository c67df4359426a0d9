//! PDF document viewer: pan by mouse or single-touch drag, pinch and
//! modifier-gated wheel zoom, fit-to-width on load. Rasterization is done by
//! the PDF.js collaborator; gesture state lives in
//! `state::gesture::PointerGestureController`.
//!
//! Render cost is balanced per update: translate-only changes are applied as
//! a CSS transform on the canvas, scale changes re-rasterize at the new scale
//! (gesture updates are coalesced to one per input event, so this stays
//! responsive); a window resize re-renders after a 250ms quiet period.

use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    CanvasRenderingContext2d, CustomEvent, CustomEventInit, HtmlCanvasElement, HtmlElement,
    MouseEvent, TouchEvent, WheelEvent,
};
use yew::prelude::*;

use super::zoom_controls::ZoomControls;
use crate::pdfjs;
use crate::state::gesture::{
    BUTTON_ZOOM_STEP, PointerGestureController, RenderRequest, ScaleLimits, WHEEL_ZOOM_STEP,
};
use crate::state::viewport::{Point, Viewport, content_point_under, fit_scale, translate_to_keep};
use crate::util;

const FIT_PADDING_PX: f64 = 16.0;
const FIT_MIN_CLAMP: f64 = 0.8;
const FIT_MAX_CLAMP: f64 = 3.0;
const RESIZE_DEBOUNCE_MS: i32 = 250;
/// Eased transition re-enabled between gestures so programmatic moves glide.
const CANVAS_EASE: &str = "transform 0.1s ease-out";
const HELP_HINT_KEY: &str = "pdf-help-seen";
/// Fired on the viewer container whenever the scale changes; detail: {scale}.
pub const ZOOM_CHANGE_EVENT: &str = "document-zoom-change";

#[derive(Clone, Copy, PartialEq)]
enum HintPhase {
    Hidden,
    Visible,
    Fading,
}

#[derive(Properties, PartialEq, Clone)]
pub struct DocumentViewProps {
    pub pdf_path: String,
}

fn touch_point(t: &web_sys::Touch) -> Point {
    Point::new(t.client_x() as f64, t.client_y() as f64)
}

fn update_position(canvas: &HtmlCanvasElement, vp: &Viewport) {
    let _ = canvas.style().set_property(
        "transform",
        &format!("translate({}px, {}px)", vp.translate_x, vp.translate_y),
    );
}

fn dispatch_zoom_change(target: &HtmlElement, scale: f64) {
    let detail = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&detail, &JsValue::from_str("scale"), &JsValue::from_f64(scale));
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    if let Ok(event) = CustomEvent::new_with_event_init_dict(ZOOM_CHANGE_EVENT, &init) {
        let _ = target.dispatch_event(&event);
    }
}

/// Screen position (in viewer content coordinates) of the content origin at
/// zero translate: the canvas center with the applied transform backed out.
fn canvas_anchor(viewer: &HtmlElement, canvas: &HtmlCanvasElement, vp: &Viewport) -> Point {
    let viewer_rect = viewer.get_bounding_client_rect();
    let canvas_rect = canvas.get_bounding_client_rect();
    Point::new(
        canvas_rect.left() - viewer_rect.left() + canvas_rect.width() / 2.0
            + viewer.scroll_left() as f64
            - vp.translate_x,
        canvas_rect.top() - viewer_rect.top() + canvas_rect.height() / 2.0
            + viewer.scroll_top() as f64
            - vp.translate_y,
    )
}

fn fit_scale_for(viewer: &HtmlElement, page_width_at_one: f64) -> f64 {
    let container_width = match viewer.offset_width() {
        w if w > 0 => w as f64,
        _ => 400.0,
    };
    let size_factor = if util::is_mobile() { 0.98 } else { 0.95 };
    fit_scale(
        page_width_at_one,
        container_width,
        FIT_PADDING_PX,
        size_factor,
        FIT_MIN_CLAMP,
        FIT_MAX_CLAMP,
    )
}

#[function_component(DocumentView)]
pub fn document_view(props: &DocumentViewProps) -> Html {
    let container_ref = use_node_ref();
    let viewer_ref = use_node_ref();
    let wrapper_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let error = use_state_eq(|| None::<String>);
    let zoom_label = use_state_eq(|| String::from("100%"));
    let hint = use_state_eq(|| HintPhase::Hidden);
    let controller = use_mut_ref(|| PointerGestureController::new(ScaleLimits::default()));
    let page_ref = use_mut_ref(|| None::<pdfjs::PdfPage>);
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);

    {
        let container_ref = container_ref.clone();
        let viewer_ref = viewer_ref.clone();
        let wrapper_ref = wrapper_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let error = error.clone();
        let zoom_label = zoom_label.clone();
        let hint = hint.clone();
        let controller = controller.clone();
        let page_ref = page_ref.clone();
        let draw_ref = draw_ref.clone();

        use_effect_with(props.pdf_path.clone(), move |path| {
            let window = web_sys::window().expect("no global `window` exists");
            let container: HtmlElement = container_ref
                .cast::<HtmlElement>()
                .expect("container_ref not attached");
            let viewer: HtmlElement = viewer_ref
                .cast::<HtmlElement>()
                .expect("viewer_ref not attached");
            let wrapper: HtmlElement = wrapper_ref
                .cast::<HtmlElement>()
                .expect("wrapper_ref not attached");
            let canvas: HtmlCanvasElement = canvas_ref
                .cast::<HtmlCanvasElement>()
                .expect("canvas_ref not attached to a canvas element");
            error.set(None);

            // Rasterize the page at the current scale, then reapply the
            // translate transform and notify zoom subscribers.
            let draw: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let container = container.clone();
                let page_ref = page_ref.clone();
                let controller = controller.clone();
                let zoom_label = zoom_label.clone();
                let window = window.clone();
                Rc::new(move || {
                    let page_slot = page_ref.borrow();
                    let Some(page) = page_slot.as_ref() else {
                        return;
                    };
                    let vp = controller.borrow().viewport();
                    let page_viewport = page.viewport_at(vp.scale);
                    let dpr = match window.device_pixel_ratio() {
                        r if r > 0.0 => r,
                        _ => 1.0,
                    };
                    canvas.set_width((page_viewport.width() * dpr).floor() as u32);
                    canvas.set_height((page_viewport.height() * dpr).floor() as u32);
                    let style = canvas.style();
                    let _ = style.set_property("width", &format!("{}px", page_viewport.width()));
                    let _ = style.set_property("height", &format!("{}px", page_viewport.height()));
                    if let Ok(Some(ctx)) = canvas.get_context("2d") {
                        if let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() {
                            ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
                            let _ = ctx.scale(dpr, dpr);
                            page.render_to(&ctx, &page_viewport);
                        }
                    }
                    update_position(&canvas, &vp);
                    zoom_label.set(format!("{:.0}%", vp.scale * 100.0));
                    dispatch_zoom_change(&container, vp.scale);
                })
            };
            *draw_ref.borrow_mut() = Some(draw.clone());

            // Load the document and page 1, fit to the container width, draw.
            if !pdfjs::is_available() {
                util::cerror("PDF.js library is not loaded");
                error.set(Some("The PDF library could not be found.".into()));
            } else {
                let path = path.clone();
                let error = error.clone();
                let hint = hint.clone();
                let page_ref = page_ref.clone();
                let controller = controller.clone();
                let viewer = viewer.clone();
                let draw = draw.clone();
                let window_load = window.clone();
                spawn_local(async move {
                    let page = match pdfjs::load_document(&path).await {
                        Ok(doc) => doc.page(1).await,
                        Err(e) => Err(e),
                    };
                    match page {
                        Err(e) => {
                            util::cerror(&format!("PDF load error: {e:?}"));
                            error.set(Some(format!("Failed to load the document: {path}")));
                        }
                        Ok(page) => {
                            let page_width = page.viewport_at(1.0).width();
                            *page_ref.borrow_mut() = Some(page);
                            let fit = fit_scale_for(&viewer, page_width);
                            controller.borrow_mut().reset_to_fit(fit);
                            draw();

                            // One-time gesture hint, persisted once dismissed.
                            let already_seen = window_load
                                .local_storage()
                                .ok()
                                .flatten()
                                .and_then(|s| s.get_item(HELP_HINT_KEY).ok().flatten())
                                .is_some();
                            if !already_seen {
                                let hint = hint.clone();
                                util::set_timeout(&window_load, 1000, move || {
                                    hint.set(HintPhase::Visible);
                                    let Some(win) = web_sys::window() else {
                                        return;
                                    };
                                    let hint = hint.clone();
                                    util::set_timeout(&win, 5000, move || {
                                        hint.set(HintPhase::Fading);
                                        let Some(win) = web_sys::window() else {
                                            return;
                                        };
                                        let hint = hint.clone();
                                        let win2 = win.clone();
                                        util::set_timeout(&win, 300, move || {
                                            hint.set(HintPhase::Hidden);
                                            if let Ok(Some(store)) =
                                                win2.local_storage()
                                            {
                                                let _ = store.set_item(HELP_HINT_KEY, "true");
                                            }
                                        });
                                    });
                                });
                            }
                        }
                    }
                });
            }

            // Mouse drag: begin on the wrapper, track/release on the window
            // so the drag survives leaving the viewer.
            let mousedown_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                let wrapper = wrapper.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    if e.button() != 0 {
                        return;
                    }
                    controller
                        .borrow_mut()
                        .begin_drag(Point::new(e.client_x() as f64, e.client_y() as f64));
                    let _ = wrapper.style().set_property("cursor", "grabbing");
                    let _ = canvas.style().set_property("transition", "none");
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            wrapper
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .unwrap();

            let mousemove_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    if !controller.borrow().is_dragging() {
                        return;
                    }
                    let req = controller
                        .borrow_mut()
                        .drag_to(Point::new(e.client_x() as f64, e.client_y() as f64));
                    if req == RenderRequest::Reposition {
                        update_position(&canvas, &controller.borrow().viewport());
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .unwrap();

            let mouseup_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                let wrapper = wrapper.clone();
                Closure::wrap(Box::new(move |_e: MouseEvent| {
                    if !controller.borrow().is_dragging() {
                        return;
                    }
                    controller.borrow_mut().end_drag();
                    let _ = wrapper.style().set_property("cursor", "grab");
                    let _ = canvas.style().set_property("transition", CANVAS_EASE);
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .unwrap();

            // Modifier-gated wheel zoom, anchored at the cursor. Handled
            // synchronously, outside the gesture session model; an unmodified
            // wheel is left to native scrolling.
            let wheel_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                let viewer = viewer.clone();
                let page_ref = page_ref.clone();
                let draw_ref = draw_ref.clone();
                Closure::wrap(Box::new(move |e: WheelEvent| {
                    if !(e.ctrl_key() || e.meta_key()) {
                        return;
                    }
                    e.prevent_default();
                    if page_ref.borrow().is_none() {
                        return;
                    }
                    let viewer_rect = viewer.get_bounding_client_rect();
                    let focal = Point::new(
                        e.client_x() as f64 - viewer_rect.left() + viewer.scroll_left() as f64,
                        e.client_y() as f64 - viewer_rect.top() + viewer.scroll_top() as f64,
                    );
                    let vp = controller.borrow().viewport();
                    let step = if e.delta_y() > 0.0 {
                        -WHEEL_ZOOM_STEP
                    } else {
                        WHEEL_ZOOM_STEP
                    };
                    let anchor = canvas_anchor(&viewer, &canvas, &vp);
                    let content = content_point_under(&vp, focal, anchor);
                    let req = controller.borrow_mut().zoom_to(vp.scale + step);
                    if req != RenderRequest::Rasterize {
                        return;
                    }
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                    // The canvas changed size; re-derive the anchor before
                    // fixing the translate so the focal point stays put.
                    let vp = controller.borrow().viewport();
                    let anchor = canvas_anchor(&viewer, &canvas, &vp);
                    let (tx, ty) = translate_to_keep(content, vp.scale, focal, anchor);
                    controller.borrow_mut().set_translate(tx, ty);
                    update_position(&canvas, &controller.borrow().viewport());
                }) as Box<dyn FnMut(_)>)
            };
            let passive_off = web_sys::AddEventListenerOptions::new();
            passive_off.set_passive(false);
            viewer
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                    &passive_off,
                )
                .unwrap();

            // Touch: one finger drags, a second finger pre-empts into a pinch.
            let touch_start_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    match touches.length() {
                        1 => {
                            if let Some(t) = touches.item(0) {
                                controller.borrow_mut().begin_drag(touch_point(&t));
                                let _ = canvas.style().set_property("transition", "none");
                            }
                        }
                        2 => {
                            if let (Some(a), Some(b)) = (touches.item(0), touches.item(1)) {
                                controller
                                    .borrow_mut()
                                    .begin_pinch(touch_point(&a), touch_point(&b));
                                let _ = canvas.style().set_property("transition", "none");
                            }
                        }
                        _ => {}
                    }
                }) as Box<dyn FnMut(_)>)
            };
            wrapper
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                    &passive_off,
                )
                .unwrap();

            let touch_move_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                let draw_ref = draw_ref.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    if touches.length() == 1 && controller.borrow().is_dragging() {
                        if e.cancelable() {
                            e.prevent_default();
                        }
                        if let Some(t) = touches.item(0) {
                            let req = controller.borrow_mut().drag_to(touch_point(&t));
                            if req == RenderRequest::Reposition {
                                update_position(&canvas, &controller.borrow().viewport());
                            }
                        }
                    } else if touches.length() == 2 && controller.borrow().is_pinching() {
                        if e.cancelable() {
                            e.prevent_default();
                        }
                        if let (Some(a), Some(b)) = (touches.item(0), touches.item(1)) {
                            let req = controller
                                .borrow_mut()
                                .pinch_to(touch_point(&a), touch_point(&b));
                            if req == RenderRequest::Rasterize {
                                if let Some(f) = &*draw_ref.borrow() {
                                    f();
                                }
                            }
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            wrapper
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                    &passive_off,
                )
                .unwrap();

            let touch_end_cb = {
                let controller = controller.clone();
                let canvas = canvas.clone();
                let wrapper = wrapper.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let remaining = e.touches().length();
                    controller.borrow_mut().touches_released(remaining);
                    if matches!(
                        controller.borrow().session(),
                        crate::state::gesture::GestureSession::Idle
                    ) {
                        let _ = wrapper.style().set_property("cursor", "grab");
                        let _ = canvas.style().set_property("transition", CANVAS_EASE);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            wrapper
                .add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())
                .ok();
            wrapper
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();

            // Resize: re-render after a quiet period, keeping the scale the
            // user chose or recomputing the fit when they never zoomed.
            let resize_timeout = std::rc::Rc::new(std::cell::RefCell::new(None::<i32>));
            let resize_cb = {
                let controller = controller.clone();
                let page_ref = page_ref.clone();
                let draw_ref = draw_ref.clone();
                let viewer = viewer.clone();
                let window = window.clone();
                let resize_timeout = resize_timeout.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    if let Some(id) = resize_timeout.borrow_mut().take() {
                        window.clear_timeout_with_handle(id);
                    }
                    let controller = controller.clone();
                    let page_ref = page_ref.clone();
                    let draw_ref = draw_ref.clone();
                    let viewer = viewer.clone();
                    let id = util::set_timeout(&window, RESIZE_DEBOUNCE_MS, move || {
                        let page_width = match &*page_ref.borrow() {
                            Some(page) => page.viewport_at(1.0).width(),
                            None => return,
                        };
                        if !controller.borrow().user_scaled() {
                            let fit = fit_scale_for(&viewer, page_width);
                            controller.borrow_mut().set_fit_scale(fit);
                        }
                        if let Some(f) = &*draw_ref.borrow() {
                            f();
                        }
                    });
                    *resize_timeout.borrow_mut() = id;
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .unwrap();

            // Cleanup
            let window_clone = window.clone();
            move || {
                let _ = wrapper.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = viewer.remove_event_listener_with_callback(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                );
                let _ = wrapper.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = wrapper.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = wrapper.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = wrapper.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                if let Some(id) = resize_timeout.borrow_mut().take() {
                    window_clone.clear_timeout_with_handle(id);
                }
                let _keep_alive = (
                    &mousedown_cb,
                    &mousemove_cb,
                    &mouseup_cb,
                    &wheel_cb,
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                    &resize_cb,
                );
            }
        });
    }

    let zoom_in = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        Callback::from(move |_| {
            let scale = controller.borrow().viewport().scale;
            let req = controller.borrow_mut().zoom_to(scale + BUTTON_ZOOM_STEP);
            if req == RenderRequest::Rasterize {
                if let Some(f) = &*draw_ref.borrow() {
                    f();
                }
            }
        })
    };
    let zoom_out = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        Callback::from(move |_| {
            let scale = controller.borrow().viewport().scale;
            let req = controller.borrow_mut().zoom_to(scale - BUTTON_ZOOM_STEP);
            if req == RenderRequest::Rasterize {
                if let Some(f) = &*draw_ref.borrow() {
                    f();
                }
            }
        })
    };
    let reset = {
        let controller = controller.clone();
        let draw_ref = draw_ref.clone();
        let page_ref = page_ref.clone();
        let viewer_ref = viewer_ref.clone();
        Callback::from(move |_| {
            let page_width = match &*page_ref.borrow() {
                Some(page) => page.viewport_at(1.0).width(),
                None => return,
            };
            let Some(viewer) = viewer_ref.cast::<HtmlElement>() else {
                return;
            };
            let fit = fit_scale_for(&viewer, page_width);
            controller.borrow_mut().reset_to_fit(fit);
            if let Some(f) = &*draw_ref.borrow() {
                f();
            }
        })
    };

    let hint_html = match *hint {
        HintPhase::Hidden => html! {},
        HintPhase::Visible => html! {
            <div class="pdf-first-time-tooltip">{"ドラッグで移動、ピンチで拡大縮小できます"}</div>
        },
        HintPhase::Fading => html! {
            <div class="pdf-first-time-tooltip" style="opacity:0; transition:opacity 0.3s ease;">
                {"ドラッグで移動、ピンチで拡大縮小できます"}
            </div>
        },
    };

    html! {
        <div class="document-viewer" ref={container_ref} style="flex:1; position:relative;">
            <ZoomControls
                on_zoom_in={zoom_in}
                on_zoom_out={zoom_out}
                on_reset={reset}
                label={(*zoom_label).clone()}
            />
            if let Some(message) = &*error {
                <div class="pdf-error" style="padding:2rem; text-align:center; opacity:0.7;">
                    { message.clone() }
                </div>
            } else {
                <div
                    class="pdf-viewer"
                    ref={viewer_ref}
                    style="width:100%; height:600px; background-color:#181818; overflow:auto; position:relative; touch-action:none;"
                >
                    <div
                        class="canvas-wrapper"
                        ref={wrapper_ref}
                        style="position:relative; width:100%; height:100%; overflow:hidden; cursor:grab; transform-origin:0 0;"
                    >
                        <canvas
                            ref={canvas_ref}
                            style="display:block; margin:0 auto; position:relative; transition:transform 0.1s ease-out; max-width:none; max-height:none; box-sizing:content-box;"
                        />
                    </div>
                    { hint_html }
                </div>
            }
        </div>
    }
}
