pub mod app;
pub mod components;
pub mod dialog;
pub mod events;
pub mod input;
pub mod selection;
pub mod theme;
pub mod ui;

pub use app::{run, App, AppMode};
