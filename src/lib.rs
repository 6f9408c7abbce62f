pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod screens;

pub use error::{Error, Result};
