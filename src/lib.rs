#![forbid(unsafe_code)]

pub mod admin;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod library;
pub mod logging;
pub mod paginator;
pub mod reader;
pub mod sequencer;
pub mod store;
