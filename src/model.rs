//! Course data model mirroring `course_data.json`, plus the async loader.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseData {
    pub subjects: Vec<Subject>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_name: String,
    pub units: Vec<Unit>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_name: String,
    pub videos: Vec<Video>,
    #[serde(default)]
    pub materials: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_number: u32,
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub material_file_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Video {
    pub fn is_ready(&self) -> bool {
        self.youtube_id.is_some()
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.youtube_id
            .as_ref()
            .map(|id| format!("https://img.youtube.com/vi/{id}/mqdefault.jpg"))
    }
}

/// The unit currently shown by the player page.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitData {
    pub subject_name: String,
    pub unit_name: String,
    pub videos: Vec<Video>,
}

impl UnitData {
    pub fn find_video(&self, number: u32) -> Option<&Video> {
        self.videos.iter().find(|v| v.video_number == number)
    }

    /// Path of a video's PDF material under `materials/pdf/`.
    pub fn material_pdf_path(&self, video: &Video) -> Option<String> {
        let file_id = video.material_file_id.as_ref()?;
        let file_name = if file_id.ends_with(".pdf") {
            file_id.clone()
        } else {
            format!("{file_id}.pdf")
        };
        Some(format!(
            "materials/pdf/{}/{}/{}",
            subject_folder(&self.subject_name),
            String::from(js_sys::encode_uri_component(&self.unit_name)),
            String::from(js_sys::encode_uri_component(&file_name)),
        ))
    }
}

pub fn subject_folder(subject_name: &str) -> &'static str {
    match subject_name {
        "数Ⅰ" => "math_1",
        "数Ⅱ" => "math_2",
        "数Ⅲ" => "math_3",
        "数A" => "math_A",
        "数B" => "math_B",
        "数C" => "math_c",
        _ => "math_1",
    }
}

#[derive(Debug, Error)]
pub enum CourseDataError {
    #[error("course data request failed: {0}")]
    Network(String),
    #[error("course data request returned HTTP {0}")]
    Http(u16),
    #[error("course data is malformed: {0}")]
    Malformed(String),
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    #[error("unit not found: {0}")]
    UnitNotFound(String),
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Fetch and decode `course_data.json`.
pub async fn load_course_data(url: &str) -> Result<CourseData, CourseDataError> {
    let window = web_sys::window().ok_or_else(|| CourseDataError::Network("no window".into()))?;
    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(url, &opts)
        .map_err(|e| CourseDataError::Network(js_error(e)))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| CourseDataError::Network(js_error(e)))?
        .dyn_into()
        .map_err(|e| CourseDataError::Network(js_error(e)))?;
    if !response.ok() {
        return Err(CourseDataError::Http(response.status()));
    }
    let text = JsFuture::from(
        response
            .text()
            .map_err(|e| CourseDataError::Network(js_error(e)))?,
    )
    .await
    .map_err(|e| CourseDataError::Network(js_error(e)))?
    .as_string()
    .ok_or_else(|| CourseDataError::Malformed("body is not text".into()))?;
    serde_json::from_str(&text).map_err(|e| CourseDataError::Malformed(e.to_string()))
}

/// Select the unit named by the page's query parameters.
pub fn select_unit(
    data: &CourseData,
    subject_name: &str,
    unit_name: &str,
) -> Result<UnitData, CourseDataError> {
    let subject = data
        .subjects
        .iter()
        .find(|s| s.subject_name == subject_name)
        .ok_or_else(|| CourseDataError::SubjectNotFound(subject_name.to_string()))?;
    let unit = subject
        .units
        .iter()
        .find(|u| u.unit_name == unit_name)
        .ok_or_else(|| CourseDataError::UnitNotFound(unit_name.to_string()))?;
    Ok(UnitData {
        subject_name: subject.subject_name.clone(),
        unit_name: unit.unit_name.clone(),
        videos: unit.videos.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CourseData {
        serde_json::from_str(
            r#"{
                "subjects": [{
                    "subject_name": "数Ⅰ",
                    "units": [{
                        "unit_name": "二次関数",
                        "videos": [
                            {"video_number": 1, "title": "導入", "duration": "12:30",
                             "youtube_id": "abc123", "material_file_id": "lesson-1"},
                            {"video_number": 2, "title": "続き"}
                        ]
                    }]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn selects_unit_by_subject_and_name() {
        let data = sample();
        let unit = select_unit(&data, "数Ⅰ", "二次関数").unwrap();
        assert_eq!(unit.videos.len(), 2);
        assert!(unit.find_video(1).unwrap().is_ready());
        assert!(!unit.find_video(2).unwrap().is_ready());
        assert!(unit.find_video(3).is_none());
    }

    #[test]
    fn missing_subject_or_unit_is_an_error() {
        let data = sample();
        assert!(matches!(
            select_unit(&data, "数Ⅱ", "二次関数"),
            Err(CourseDataError::SubjectNotFound(_))
        ));
        assert!(matches!(
            select_unit(&data, "数Ⅰ", "三角比"),
            Err(CourseDataError::UnitNotFound(_))
        ));
    }

    #[test]
    fn subject_folder_mapping_defaults_to_math_1() {
        assert_eq!(subject_folder("数B"), "math_B");
        assert_eq!(subject_folder("unknown"), "math_1");
    }

    #[test]
    fn thumbnail_only_for_ready_videos() {
        let data = sample();
        let unit = select_unit(&data, "数Ⅰ", "二次関数").unwrap();
        assert_eq!(
            unit.find_video(1).unwrap().thumbnail_url().as_deref(),
            Some("https://img.youtube.com/vi/abc123/mqdefault.jpg")
        );
        assert!(unit.find_video(2).unwrap().thumbnail_url().is_none());
    }
}
