use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_reset: Callback<()>,
    /// Current zoom as a percentage label, fed by the scale-change event.
    pub label: String,
}

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div class="pdf-controls" style="display:flex; gap:6px; align-items:center; padding:4px 8px;">
        <button onclick={zo}>{"−"}</button>
        <span class="pdf-zoom-level" style="min-width:48px; text-align:center;">{ &props.label }</span>
        <button onclick={zi}>{"+"}</button>
        <span style="width:8px;"></span>
        <button onclick={rs}>{"Reset"}</button>
    </div>}
}
