//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters implement.

pub mod model_gateway;
pub mod persona;
pub mod progress;
