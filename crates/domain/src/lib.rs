//! autotweet domain crate
//!
//! This crate contains the core publish pipeline following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Extraction, transcoding, composition and the orchestrating pipeline
//! - `policy`: Budgets, caps and thresholds

pub mod model;
pub mod policy;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use policy::*;
pub use ports::*;
