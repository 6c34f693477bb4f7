//! Progress sinks for the terminal

pub mod reporter;
