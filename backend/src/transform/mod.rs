//! Transformation module.
//!
//! This module handles working table to target entity projection:
//! - Projection: Derive/drop/rename/massage steps
//! - Entities: Accounts, Contacts, Orders, Treatments
//! - Pipeline: Load and project per entity

pub mod entities;
pub mod pipeline;
pub mod projection;

pub use entities::{accounts, contacts, orders, treatments};
pub use pipeline::*;
pub use projection::Projector;
