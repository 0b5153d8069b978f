mod app;
mod debug;
mod dom;
mod palette;
mod panel;
mod persistence;
mod render;
mod state;

pub use app::run;
