//! # bastion-policy
//!
//! Capability registry and risk classifier for the BASTION runtime, both
//! configurable from TOML.
//!
//! ## Overview
//!
//! This crate provides [`InMemoryCapabilityRegistry`], which implements the
//! [`CapabilityRegistry`](bastion_core::traits::CapabilityRegistry) trait, and
//! [`RuleClassifier`], which implements
//! [`RiskClassifier`](bastion_core::traits::RiskClassifier). Both can be built
//! from the same TOML document.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use bastion_policy::{InMemoryCapabilityRegistry, PolicyConfig, RuleClassifier};
//!
//! let config = PolicyConfig::from_file(Path::new("policies/demo-agent.toml"))?;
//! let registry = InMemoryCapabilityRegistry::from_config(&config)?;
//! let classifier = RuleClassifier::from_config(&config);
//! // Pass both to `bastion_core::Interceptor::new(...)`.
//! ```
//!
//! ## Matching
//!
//! Action types match exactly. Resource patterns and escalation action
//! patterns are either exact strings or a prefix ending in a single `*`.
//! Anything not granted is denied.

pub mod classifier;
pub mod manifest;
pub mod registry;

pub use classifier::RuleClassifier;
pub use manifest::{
    default_escalations, AgentManifest, ClassifierSettings, EscalationRule, PolicyConfig,
    RegistrationMode, RegistrySettings,
};
pub use registry::InMemoryCapabilityRegistry;

// ── Tests ─────────────────────────────────────────────────────────────────────
