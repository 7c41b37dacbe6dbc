//! # bastion-contracts
//!
//! Shared types, records, and contracts for the BASTION access-control
//! runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, matching helpers, and error types.

pub mod action;
pub mod agent;
pub mod audit;
pub mod capability;
pub mod decision;
pub mod error;
pub mod trust;
pub mod verify;
