// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request security context.
//!
//! The authorization middleware inserts exactly one [`SecurityContext`] into
//! every request's extensions. It lives and dies with that request, so
//! concurrent requests never see each other's identity.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::{Principal, SubjectId};

/// Identity recovered from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject id.
    pub subject_id: SubjectId,
    /// Role as embedded in the token.
    pub role: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(subject_id: SubjectId, role: impl Into<String>) -> Self {
        Self {
            subject_id,
            role: role.into(),
        }
    }

    /// Returns `true` if the identity carries `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

impl From<Principal> for Identity {
    fn from(principal: Principal) -> Self {
        Self {
            subject_id: principal.id,
            role: principal.role,
        }
    }
}

/// Security context for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    /// Validated identity, if any.
    pub identity: Option<Identity>,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
}

impl SecurityContext {
    /// Creates an empty (unauthenticated) context.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates an authenticated context.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Self::anonymous()
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Returns `true` only when an identity was installed after validation.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns the subject id, if authenticated.
    pub fn subject_id(&self) -> Option<SubjectId> {
        self.identity.as_ref().map(|i| i.subject_id)
    }

    /// Returns the role, if authenticated.
    pub fn role(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.role.as_str())
    }
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
