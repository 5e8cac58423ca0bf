pub mod fetch;
pub mod models;
pub mod navigation;
pub mod ui;
