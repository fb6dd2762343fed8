pub mod antibot;
pub mod browser_manager;
pub mod renderer;

pub use renderer::{ChromiumRenderer, PageRenderer};
