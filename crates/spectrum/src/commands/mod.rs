//! Command implementations for the spectrum CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod ask;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod history;
pub mod keys;
pub mod models;
pub mod providers;
pub mod summary;
