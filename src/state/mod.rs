pub mod gesture;
pub mod panel;
pub mod sheet;
pub mod viewport;
