//! Application state module

mod app_state;
pub mod body_area;
pub mod directory;
pub mod forms;
pub mod schedule;

pub use app_state::*;
