//! Capability-based access control types.
//!
//! An agent may only take an action if it holds a capability whose action
//! type equals the requested one and whose resource pattern (if any) matches
//! the requested resource. Capabilities are declared at registration and are
//! never elevated at runtime.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A resource scoping rule attached to a capability.
///
/// Two forms are recognised:
/// - an exact string, which must equal the resource byte-for-byte;
/// - a string ending in a single `*`, which matches every resource starting
///   with the text before the `*`. A lone `"*"` matches any resource.
///
/// A `*` anywhere other than the final position is treated literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePattern(pub String);

impl ResourcePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Return true if `resource` falls under this pattern.
    pub fn matches(&self, resource: &str) -> bool {
        match self.0.strip_suffix('*') {
            Some(prefix) => resource.starts_with(prefix),
            None => self.0 == resource,
        }
    }
}

impl fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single grant: an action type, optionally narrowed to a resource pattern.
///
/// Action types are namespaced strings such as `"database:read"` or
/// `"payment:process"`. Without a resource pattern the grant covers every
/// resource under that action type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourcePattern>,
}

impl Capability {
    /// An unrestricted grant for `action_type`.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            resource: None,
        }
    }

    /// A grant for `action_type` limited to resources matching `pattern`.
    pub fn scoped(action_type: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            resource: Some(ResourcePattern::new(pattern)),
        }
    }

    /// Return true if this grant authorizes `action_type` on `resource`.
    ///
    /// The action type must match exactly; there is no namespace wildcarding.
    pub fn covers(&self, action_type: &str, resource: &str) -> bool {
        if self.action_type != action_type {
            return false;
        }
        match &self.resource {
            Some(pattern) => pattern.matches(resource),
            None => true,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(pattern) => write!(f, "{}[{}]", self.action_type, pattern),
            None => f.write_str(&self.action_type),
        }
    }
}

/// The full set of capabilities declared by an agent.
///
/// Constructed by the hosting application (or loaded from configuration) and
/// handed to the registry once, at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    inner: HashSet<Capability>,
}

impl CapabilitySet {
    /// Grant a capability to this set.
    pub fn grant(&mut self, capability: Capability) {
        self.inner.insert(capability);
    }

    /// Return true if the set contains exactly this capability.
    pub fn has(&self, capability: &Capability) -> bool {
        self.inner.contains(capability)
    }

    /// Return true if any capability in the set covers `action_type` on
    /// `resource`. An empty set permits nothing.
    pub fn permits(&self, action_type: &str, resource: &str) -> bool {
        self.inner.iter().any(|c| c.covers(action_type, resource))
    }

    /// Return an iterator over all granted capabilities.
    pub fn all(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
