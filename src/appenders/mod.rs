//! Appender implementations

pub mod console;
pub mod file;
pub mod json;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use json::JsonAppender;

pub use crate::core::Appender;
