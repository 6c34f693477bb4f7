//! Rendering of streamed progress events

pub mod sse;
