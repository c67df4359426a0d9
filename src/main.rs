mod components;
mod model;
mod pdfjs;
mod state;
mod util;
mod youtube;

use components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
