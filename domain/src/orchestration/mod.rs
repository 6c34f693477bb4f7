//! Reasoning orchestration domain
//!
//! Strategies, their stage plans, the records a run produces, and the
//! progress events it publishes.

pub mod entities;
pub mod event;
pub mod request;
pub mod strategy;
pub mod value_objects;
