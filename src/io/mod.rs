/// Command-line interface and evaluation probe
pub mod cli;
/// Constants and runtime defaults
pub mod configuration;
/// Error types
pub mod error;
/// Target loading and PNG export
pub mod image;
/// Progress display
pub mod progress;
