//! Terminal map of official reference layers and community incident reports.

pub mod app;
pub mod braille;
pub mod chart;
pub mod cli;
pub mod config;
pub mod control;
pub mod data;
pub mod headless;
pub mod map;
pub mod popup;
pub mod session;
pub mod style;
pub mod tally;
pub mod ui;
