//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;

pub use config::{Config, ParseConfig};
pub use diagnostic::Diagnostic;
pub use fs::{FileSystem, LiveFileSystem, MemoryFileSystem};
