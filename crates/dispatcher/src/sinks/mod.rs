//! Sink implementations
//!
//! Contains ConsoleSink and LogSink.

mod console;
mod log;

pub use self::console::ConsoleSink;
pub use self::log::LogSink;
