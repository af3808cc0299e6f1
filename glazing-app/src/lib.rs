//! The `glazing` command-line host: settings, logging, the interactive
//! wizard and the chat REPL.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod wizard_host;
