pub mod app;
pub mod dialog;
pub mod events;
pub mod input;
pub mod selection;
pub mod theme;
pub mod ui;

pub use app::{App, AppMode, Outcome};
