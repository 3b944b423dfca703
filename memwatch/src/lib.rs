//! memwatch: polls a JSON memory/CPU endpoint and charts a rolling window in the terminal.
//!
//! Pipeline: [`fetch`] -> [`normalize`] -> [`history`] window, driven by [`scheduler`].

pub mod app;
pub mod config;
pub mod fetch;
pub mod history;
pub mod normalize;
pub mod scheduler;
pub mod synthetic;
pub mod types;
pub mod ui;
