// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AuthResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::principal::{SubjectId, TokenPair};
use crate::token::TokenService;

// =============================================================================
// Refresh
// =============================================================================

/// Refresh request body.
#[derive(Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// POST /auth/refresh
///
/// Exchanges a refresh token for a new pair.
pub async fn refresh_token(
    State(tokens): State<TokenService>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> AuthResult<Json<TokenPair>> {
    let pair = tokens.refresh(&request.refresh_token).await?;
    Ok(Json(pair))
}

// =============================================================================
// Current User
// =============================================================================

/// Current identity response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// Subject id.
    pub subject_id: SubjectId,
    /// Role embedded in the access token.
    pub role: String,
}

/// GET /auth/me
///
/// Returns the identity of the caller.
pub async fn current_user(Auth(identity): Auth) -> Json<MeResponse> {
    Json(MeResponse {
        subject_id: identity.subject_id,
        role: identity.role,
    })
}
