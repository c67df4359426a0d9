//! Bindings to the YouTube IFrame API collaborator: create, switch and
//! destroy the embedded player. Playback behavior itself is out of scope.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = YT, js_name = Player)]
    pub type Player;

    #[wasm_bindgen(constructor, js_namespace = YT, js_class = "Player")]
    pub fn new(element_id: &str, options: &JsValue) -> Player;

    #[wasm_bindgen(method, js_name = loadVideoById)]
    pub fn load_video_by_id(this: &Player, video_id: &str);

    #[wasm_bindgen(method)]
    pub fn destroy(this: &Player);
}

/// True once the IFrame API script has finished loading.
pub fn is_ready() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(yt) = Reflect::get(&window, &JsValue::from_str("YT")) else {
        return false;
    };
    if yt.is_undefined() || yt.is_null() {
        return false;
    }
    Reflect::get(&yt, &JsValue::from_str("Player"))
        .map(|p| !p.is_undefined())
        .unwrap_or(false)
}

/// Player options: inline playback, no related videos.
pub fn player_options(video_id: &str) -> JsValue {
    let vars = Object::new();
    let _ = Reflect::set(&vars, &JsValue::from_str("playsinline"), &JsValue::from_f64(1.0));
    let _ = Reflect::set(&vars, &JsValue::from_str("rel"), &JsValue::from_f64(0.0));
    let options = Object::new();
    let _ = Reflect::set(&options, &JsValue::from_str("height"), &JsValue::from_str("100%"));
    let _ = Reflect::set(&options, &JsValue::from_str("width"), &JsValue::from_str("100%"));
    let _ = Reflect::set(&options, &JsValue::from_str("videoId"), &JsValue::from_str(video_id));
    let _ = Reflect::set(&options, &JsValue::from_str("playerVars"), &vars);
    options.into()
}

/// Register the global readiness callback and inject the API script. The
/// callback fires once `YT.Player` is usable.
pub fn install_api(on_ready: impl Fn() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(on_ready) as Box<dyn Fn()>);
    let _ = Reflect::set(
        &window,
        &JsValue::from_str("onYouTubeIframeAPIReady"),
        closure.as_ref(),
    );
    closure.forget();

    let Some(document) = window.document() else {
        return;
    };
    if let Ok(tag) = document.create_element("script") {
        let _ = tag.set_attribute("src", "https://www.youtube.com/iframe_api");
        if let Some(head) = document.head() {
            let _ = head.append_child(&tag);
        }
    }
}
