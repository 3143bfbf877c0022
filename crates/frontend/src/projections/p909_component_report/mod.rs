pub mod api;
pub mod pdf;
pub mod ui;
