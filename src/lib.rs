pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod github;
pub mod messaging;
pub mod storage;
pub mod utils;
