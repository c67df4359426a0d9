//! Thin bindings to the global PDF.js library (`pdfjsLib`). The viewer only
//! uses it to learn the intrinsic page size and to rasterize at a scale;
//! decoding stays on the JS side.

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::CanvasRenderingContext2d;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = pdfjsLib, js_name = getDocument)]
    fn get_document(path: &str) -> PdfLoadingTask;

    pub type PdfLoadingTask;
    #[wasm_bindgen(method, getter)]
    fn promise(this: &PdfLoadingTask) -> Promise;

    pub type PdfDocument;
    #[wasm_bindgen(method, js_name = getPage)]
    fn get_page_raw(this: &PdfDocument, number: i32) -> Promise;

    pub type PdfPage;
    #[wasm_bindgen(method, js_name = getViewport)]
    fn get_viewport_raw(this: &PdfPage, params: &JsValue) -> PdfPageViewport;
    #[wasm_bindgen(method, js_name = render)]
    fn render_raw(this: &PdfPage, params: &JsValue);

    pub type PdfPageViewport;
    #[wasm_bindgen(method, getter)]
    pub fn width(this: &PdfPageViewport) -> f64;
    #[wasm_bindgen(method, getter)]
    pub fn height(this: &PdfPageViewport) -> f64;
}

/// True when the PDF.js script tag is present.
pub fn is_available() -> bool {
    web_sys::window()
        .and_then(|w| Reflect::get(&w, &JsValue::from_str("pdfjsLib")).ok())
        .map(|v| !v.is_undefined() && !v.is_null())
        .unwrap_or(false)
}

pub async fn load_document(path: &str) -> Result<PdfDocument, JsValue> {
    let task = get_document(path);
    let document = JsFuture::from(task.promise()).await?;
    Ok(document.unchecked_into())
}

impl PdfDocument {
    pub async fn page(&self, number: i32) -> Result<PdfPage, JsValue> {
        let page = JsFuture::from(self.get_page_raw(number)).await?;
        Ok(page.unchecked_into())
    }
}

impl PdfPage {
    pub fn viewport_at(&self, scale: f64) -> PdfPageViewport {
        let params = Object::new();
        let _ = Reflect::set(&params, &JsValue::from_str("scale"), &JsValue::from_f64(scale));
        self.get_viewport_raw(&params)
    }

    pub fn render_to(&self, context: &CanvasRenderingContext2d, viewport: &PdfPageViewport) {
        let params = Object::new();
        let _ = Reflect::set(&params, &JsValue::from_str("canvasContext"), context.as_ref());
        let _ = Reflect::set(&params, &JsValue::from_str("viewport"), viewport.as_ref());
        self.render_raw(&params);
    }
}
