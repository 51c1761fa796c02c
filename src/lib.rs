//! LEP intake - photo intake for power line survey uploads.
//!
//! Users drop loose images, ZIP archives or whole folders onto a drop target
//! (or pick files). The pipeline filters out junk, expands archives, walks
//! folders of any depth and hands the consumer one flat list of images.
//!
//! The pipeline is written against the traits in [`platform`]; browser,
//! native filesystem and in-memory implementations are provided.

pub mod config;
pub mod constants;
pub mod error;
pub mod intake;
pub mod logging;
pub mod platform;

pub use config::{ConfigError, IntakeConfig, LogLevel};
pub use error::IntakeError;
pub use intake::{Dropzone, ExtractedImage, IntakeCoordinator, IntakeOutcome, IntakeSummary};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
