//! URL classifier front end: wires the core state machine to the engine.
pub mod config;
pub mod controller;
mod effects;
pub mod render;

pub use config::{ClassifierConfig, ConfigError, PolicySetting, CONFIG_FILENAME};
pub use controller::Controller;
