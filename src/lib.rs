pub mod app;
pub mod backend;
pub mod components;
pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod workflow;
