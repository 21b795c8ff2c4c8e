//! Encore CLI Library
//!
//! Terminal driver for the Encore playback core: configuration, playlist
//! files, stdin commands and tracing-based rendering.
//!
//! This library exposes the components for testing purposes.

pub mod config;
pub mod error;
pub mod input;
pub mod playlist;
pub mod render;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use input::{parse_command, Command, InputError};
pub use playlist::{Playlist, PlaylistEntry};
pub use render::{status_report, TracingRenderer};
