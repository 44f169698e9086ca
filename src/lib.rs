pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod onboarding;
pub mod profile;
pub mod settings;
pub mod store;
pub mod switch;
pub mod tui;

pub use error::{Error, Result};
