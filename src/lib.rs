pub mod cli;
pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod executor;
pub mod extract;
pub mod manifest;
pub mod render;
pub mod resources;
