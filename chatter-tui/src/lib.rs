pub mod app;
pub mod events;
pub mod logging;
pub mod theme;
pub mod ui;
