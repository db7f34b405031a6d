//! Core types shared across isoguard facilities
//!
//! This crate provides foundational types used by the error, logging and
//! orchestration layers:
//!
//! - **Correlation types**: RequestId, RunId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestId, RunId};
