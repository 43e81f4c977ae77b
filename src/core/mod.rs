pub mod config;
pub mod error;
pub mod types;

pub use config::{ControllerConfig, LlmSettings};
pub use error::{Result, VoxError};
