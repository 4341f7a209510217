pub mod app;
pub mod config;
pub mod credential;
pub mod dataset;
pub mod error;
pub mod feeds;
pub mod logging;
pub mod ui;
