//! Caller identity for keeper services
//!
//! Every service call receives an [`AuthContext`] describing who is calling.
//! Services only need two things from it:
//! - the principal identifier, written into audit fields and audit events
//! - the owner id, resolved through an [`OwnerResolver`]

use crate::core::error::{ServiceError, ServiceResult};
use crate::core::record::Identity;
use async_trait::async_trait;
use std::collections::HashMap;

/// Principal used when nobody is authenticated
pub const SYSTEM_PRINCIPAL: &str = "system";

/// Authorization context of a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User {
        identifier: String,
        roles: Vec<String>,
    },

    /// Service-to-service communication
    Service { service_name: String },

    /// Background work on behalf of the system itself
    System,

    /// No authentication
    Anonymous,
}

impl AuthContext {
    /// Authenticated user without roles
    pub fn user(identifier: impl Into<String>) -> Self {
        AuthContext::User {
            identifier: identifier.into(),
            roles: Vec::new(),
        }
    }

    /// Identifier recorded as actor; `"system"` when unauthenticated
    pub fn principal_identifier(&self) -> &str {
        match self {
            AuthContext::User { identifier, .. } => identifier,
            AuthContext::Service { service_name } => service_name,
            AuthContext::System | AuthContext::Anonymous => SYSTEM_PRINCIPAL,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User { .. } | AuthContext::Service { .. })
    }

    /// Check if the context carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            AuthContext::User { roles, .. } => roles.iter().any(|r| r == role),
            _ => false,
        }
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        AuthContext::Anonymous
    }
}

/// Maps a principal identifier to the owner id used for data isolation
#[async_trait]
pub trait OwnerResolver<O: Identity>: Send + Sync {
    /// Fails with `AccessDenied` when the principal has no owner id
    async fn resolve_owner_id(&self, principal: &str) -> ServiceResult<O>;
}

/// Fixed principal to owner table
#[derive(Debug, Clone, Default)]
pub struct StaticOwnerResolver<O: Identity> {
    owners: HashMap<String, O>,
}

impl<O: Identity> StaticOwnerResolver<O> {
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
        }
    }

    pub fn with(mut self, principal: impl Into<String>, owner: O) -> Self {
        self.owners.insert(principal.into(), owner);
        self
    }
}

#[async_trait]
impl<O: Identity> OwnerResolver<O> for StaticOwnerResolver<O> {
    async fn resolve_owner_id(&self, principal: &str) -> ServiceResult<O> {
        self.owners
            .get(principal)
            .cloned()
            .ok_or_else(|| ServiceError::access_denied("principal", principal))
    }
}
