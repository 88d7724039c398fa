pub mod actor;
pub mod common;
pub mod model;
pub mod snapping;
pub mod sys;
pub mod ui;
