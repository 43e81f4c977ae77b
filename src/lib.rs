//! VoxFeed - spoken and typed commands for a social feed client

pub mod backend;
pub mod command;
pub mod core;
pub mod llm;
pub mod screens;
pub mod ui;
