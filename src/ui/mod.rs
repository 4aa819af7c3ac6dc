//! Ratatui front-end. `App` owns the store connection and every view
//! snapshot; `run_app` drives the terminal until the user quits.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
