pub mod app;
pub mod document_view;
pub mod lesson_list;
pub mod shell;
pub mod zoom_controls;
