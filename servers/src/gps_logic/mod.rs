pub mod config;
pub mod cors;
pub mod downstream;
pub mod error;
pub mod logger;
pub mod state;
