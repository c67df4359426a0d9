use yew::prelude::*;

use crate::model::Video;

#[derive(Properties, PartialEq, Clone)]
pub struct LessonListProps {
    pub videos: Vec<Video>,
    pub current: u32,
    pub on_select: Callback<u32>,
}

#[function_component(LessonList)]
pub fn lesson_list(props: &LessonListProps) -> Html {
    let items = props.videos.iter().map(|video| {
        let ready = video.is_ready();
        let number = video.video_number;
        let class = classes!(
            "lesson-item",
            (number == props.current).then_some("active"),
            (!ready).then_some("not-ready"),
        );
        let onclick = ready.then(|| {
            let on_select = props.on_select.clone();
            Callback::from(move |_| on_select.emit(number))
        });
        let thumbnail = match video.thumbnail_url() {
            Some(url) => html! { <img src={url} alt={video.title.clone()} loading="lazy" /> },
            None => html! { <div class="thumbnail-placeholder">{"Coming soon"}</div> },
        };
        html! {
            <div key={number} {class} data-number={number.to_string()} {onclick}>
                <div class="lesson-number">{ number }</div>
                <div class="lesson-thumbnail">
                    { thumbnail }
                    if ready {
                        <div class="play-overlay">{"▶"}</div>
                    }
                </div>
                <div class="lesson-info">
                    <span class="lesson-title">
                        { &video.title }
                        if !ready {
                            <span style="opacity:0.6; font-size:0.8rem;">{" (coming soon)"}</span>
                        }
                    </span>
                    <span class="lesson-duration">{ video.duration.clone().unwrap_or_else(|| "00:00".into()) }</span>
                </div>
            </div>
        }
    });
    html! { <>{ for items }</> }
}
