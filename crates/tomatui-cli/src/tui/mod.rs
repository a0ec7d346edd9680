//! Terminal user interface: the session screen, the confirm prompt, and
//! the statistics view.

mod app;
mod confirm;
mod digits;
mod event;
pub mod stats_view;
mod terminal;
mod ui;

pub use app::run_session;
