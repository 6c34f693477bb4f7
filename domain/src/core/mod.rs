//! Core domain concepts shared across all subdomains.
//!
//! - [`participant::ParticipantId`]: stable identity of a model-backed participant
//! - [`question::Question`]: a validated question to reason about
//! - [`error::DomainError`]: request validation errors

pub mod error;
pub mod participant;
pub mod question;
pub mod string;
