pub mod app;
pub mod commands;
pub mod error;
pub mod llm;
pub mod logging;
pub mod palette;
pub mod quiz;
pub mod session;
pub mod topic;
pub mod tui;
pub mod tutor;
pub mod utils;
